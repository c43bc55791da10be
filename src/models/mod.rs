pub mod coordinates;
pub mod intervention;
pub mod wire;

pub use coordinates::Coordinates;
pub use intervention::{EmergencyKind, InterventionReport, InterventionStatus};

pub mod dispatch {
    pub mod v1 {
        include!(concat!(env!("OUT_DIR"), "/dispatch.v1.rs"));
    }
}
