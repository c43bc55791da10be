//! Conversions between the generated `dispatch.v1` messages and the domain
//! types. The messages themselves come from `proto/dispatch.proto`.

use super::coordinates;
use super::intervention::{EmergencyKind, InterventionReport, InterventionStatus};

pub use super::dispatch::v1::*;

impl From<EmergencyKind> for EmergencyType {
    fn from(kind: EmergencyKind) -> Self {
        match kind {
            EmergencyKind::RoadAccident => EmergencyType::RoadAccident,
            EmergencyKind::Fire => EmergencyType::Fire,
            EmergencyKind::Medical => EmergencyType::Medical,
            EmergencyKind::Unknown => EmergencyType::Unknown,
        }
    }
}

impl From<EmergencyType> for EmergencyKind {
    fn from(kind: EmergencyType) -> Self {
        match kind {
            EmergencyType::RoadAccident => EmergencyKind::RoadAccident,
            EmergencyType::Fire => EmergencyKind::Fire,
            EmergencyType::Medical => EmergencyKind::Medical,
            EmergencyType::Unknown => EmergencyKind::Unknown,
        }
    }
}

impl From<InterventionStatus> for ReportStatus {
    fn from(status: InterventionStatus) -> Self {
        match status {
            InterventionStatus::Pending => ReportStatus::Pending,
            InterventionStatus::InProgress => ReportStatus::InProgress,
            InterventionStatus::Completed => ReportStatus::Completed,
        }
    }
}

/// Unrecognised enum numbers from newer clients fall back to `Unknown`.
pub fn kind_from_wire(value: i32) -> EmergencyKind {
    EmergencyType::try_from(value)
        .map(EmergencyKind::from)
        .unwrap_or(EmergencyKind::Unknown)
}

impl From<coordinates::Coordinates> for Coordinates {
    fn from(c: coordinates::Coordinates) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl From<Coordinates> for coordinates::Coordinates {
    fn from(c: Coordinates) -> Self {
        coordinates::Coordinates::new(c.latitude, c.longitude)
    }
}

impl From<&InterventionReport> for HistoryRecord {
    fn from(report: &InterventionReport) -> Self {
        Self {
            r#type: EmergencyType::from(report.kind) as i32,
            position: Some(report.position.into()),
            description: report.description.clone(),
            citizen_id: report.citizen_id.clone().unwrap_or_default(),
            intervention_id: report.intervention_id.clone(),
            status: ReportStatus::from(report.status) as i32,
            created_at_unix_ms: report.created_at.timestamp_millis(),
        }
    }
}
