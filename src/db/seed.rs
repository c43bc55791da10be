use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::{InterventionStore, ScanFilter};
use crate::error::DispatchResult;
use crate::models::{Coordinates, EmergencyKind, InterventionReport, InterventionStatus};

fn demo_report() -> InterventionReport {
    InterventionReport {
        intervention_id: Uuid::new_v4().to_string(),
        kind: EmergencyKind::RoadAccident,
        position: Coordinates::new(36.8, 10.1),
        description: "Minor collision - seed data".to_string(),
        citizen_id: None,
        status: InterventionStatus::Completed,
        created_at: Utc::now(),
    }
}

/// Inserts one completed demo intervention when the store holds nothing.
/// Returns whether a record was written.
pub async fn seed_if_empty(store: &dyn InterventionStore) -> DispatchResult<bool> {
    if !store.scan(&ScanFilter::default(), 1).await?.is_empty() {
        return Ok(false);
    }
    let id = store.insert(demo_report()).await?;
    info!(intervention_id = %id, "Empty store, inserted demo intervention");
    Ok(true)
}

/// Startup wrapper: seeding problems are logged and never abort the boot.
pub async fn seed_demo_data(store: &dyn InterventionStore) {
    if let Err(e) = seed_if_empty(store).await {
        error!("Could not seed demo data: {}", e);
    }
}
