use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::coordinates::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyKind {
    RoadAccident,
    Fire,
    Medical,
    Unknown,
}

impl EmergencyKind {
    /// Kinds a citizen can pick when reporting. `Unknown` is only a fallback.
    pub const SELECTABLE: [EmergencyKind; 3] = [
        EmergencyKind::RoadAccident,
        EmergencyKind::Fire,
        EmergencyKind::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyKind::RoadAccident => "ROAD_ACCIDENT",
            EmergencyKind::Fire => "FIRE",
            EmergencyKind::Medical => "MEDICAL",
            EmergencyKind::Unknown => "UNKNOWN",
        }
    }

    /// Decodes a stored label. Legacy records carry French labels; anything
    /// unrecognised becomes `Unknown` instead of failing the read.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ROAD_ACCIDENT" | "ACCIDENT_ROUTE" => EmergencyKind::RoadAccident,
            "FIRE" | "INCENDIE" => EmergencyKind::Fire,
            "MEDICAL" => EmergencyKind::Medical,
            _ => EmergencyKind::Unknown,
        }
    }
}

impl fmt::Display for EmergencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionStatus {
    Pending,
    InProgress,
    Completed,
}

impl InterventionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStatus::Pending => "PENDING",
            InterventionStatus::InProgress => "IN_PROGRESS",
            InterventionStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "IN_PROGRESS" | "EN_COURS" => InterventionStatus::InProgress,
            "COMPLETED" | "TERMINE" => InterventionStatus::Completed,
            _ => InterventionStatus::Pending,
        }
    }

    /// Status only moves forward: PENDING -> IN_PROGRESS -> COMPLETED.
    pub fn can_advance_to(&self, next: InterventionStatus) -> bool {
        self.rank() < next.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            InterventionStatus::Pending => 0,
            InterventionStatus::InProgress => 1,
            InterventionStatus::Completed => 2,
        }
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported emergency as held by the intervention store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionReport {
    pub intervention_id: String,
    pub kind: EmergencyKind,
    pub position: Coordinates,
    pub description: String,
    pub citizen_id: Option<String>,
    pub status: InterventionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        for kind in [
            EmergencyKind::RoadAccident,
            EmergencyKind::Fire,
            EmergencyKind::Medical,
            EmergencyKind::Unknown,
        ] {
            assert_eq!(EmergencyKind::from_label(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_legacy_kind_labels() {
        assert_eq!(
            EmergencyKind::from_label("ACCIDENT_ROUTE"),
            EmergencyKind::RoadAccident
        );
        assert_eq!(EmergencyKind::from_label("incendie"), EmergencyKind::Fire);
        assert_eq!(EmergencyKind::from_label("INCONNU"), EmergencyKind::Unknown);
        assert_eq!(EmergencyKind::from_label("ALIEN_INVASION"), EmergencyKind::Unknown);
    }

    #[test]
    fn test_legacy_status_labels() {
        assert_eq!(
            InterventionStatus::from_label("EN_ATTENTE"),
            InterventionStatus::Pending
        );
        assert_eq!(
            InterventionStatus::from_label("TERMINE"),
            InterventionStatus::Completed
        );
        assert_eq!(
            InterventionStatus::from_label("garbage"),
            InterventionStatus::Pending
        );
    }

    #[test]
    fn test_status_only_moves_forward() {
        use InterventionStatus::*;
        assert!(Pending.can_advance_to(InProgress));
        assert!(Pending.can_advance_to(Completed));
        assert!(InProgress.can_advance_to(Completed));
        assert!(!InProgress.can_advance_to(InProgress));
        assert!(!Completed.can_advance_to(InProgress));
        assert!(!Completed.can_advance_to(Pending));
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&EmergencyKind::RoadAccident).unwrap();
        assert_eq!(json, "\"ROAD_ACCIDENT\"");
    }
}
