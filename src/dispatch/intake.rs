use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::DispatchService;
use crate::error::DispatchResult;
use crate::models::{Coordinates, EmergencyKind, InterventionReport, InterventionStatus};

pub const ACK_MESSAGE: &str = "Emergency services notified. Stay safe.";

/// A citizen's report as received, before it has an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyReport {
    pub kind: EmergencyKind,
    pub position: Coordinates,
    pub description: String,
    pub citizen_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    pub intervention_id: String,
    pub acknowledged: bool,
    pub message: String,
    pub status: InterventionStatus,
}

impl DispatchService {
    /// Validates and records a new emergency, returning its fresh identity.
    ///
    /// Out-of-range coordinates are rejected before anything is written.
    pub async fn signal_emergency(&self, report: EmergencyReport) -> DispatchResult<Acknowledgement> {
        report.position.validate()?;

        let record = InterventionReport {
            intervention_id: Uuid::new_v4().to_string(),
            kind: report.kind,
            position: report.position,
            description: report.description,
            citizen_id: report
                .citizen_id
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            status: InterventionStatus::Pending,
            created_at: Utc::now(),
        };

        info!(
            kind = %record.kind,
            lat = record.position.latitude,
            lon = record.position.longitude,
            "New emergency reported"
        );

        let intervention_id = match self.store.insert(record).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to record emergency: {}", e);
                return Err(e);
            }
        };
        info!(intervention_id = %intervention_id, "Emergency recorded");

        Ok(Acknowledgement {
            intervention_id,
            acknowledged: true,
            message: ACK_MESSAGE.to_string(),
            status: InterventionStatus::Pending,
        })
    }
}
