use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A WGS84 position in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite values and anything outside -90..=90 / -180..=180.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DispatchError::Validation(format!(
                "latitude {} is outside the valid range -90..90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DispatchError::Validation(format!(
                "longitude {} is outside the valid range -180..180",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Shifts the position by a (latitude, longitude) delta in degrees.
    pub fn offset(&self, delta_lat: f64, delta_lon: f64) -> Self {
        Self::new(self.latitude + delta_lat, self.longitude + delta_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_range_bounds() {
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(36.85, 10.20).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_latitude() {
        let err = Coordinates::new(90.0001, 10.0).validate().unwrap_err();
        assert!(matches!(err, DispatchError::Validation(ref m) if m.contains("latitude")));
    }

    #[test]
    fn test_rejects_out_of_range_longitude() {
        let err = Coordinates::new(0.0, -180.5).validate().unwrap_err();
        assert!(matches!(err, DispatchError::Validation(ref m) if m.contains("longitude")));
    }

    #[test]
    fn test_rejects_nan() {
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_offset() {
        let moved = Coordinates::new(36.8065, 10.1815).offset(-0.001, 0.001);
        assert!((moved.latitude - 36.8055).abs() < 1e-9);
        assert!((moved.longitude - 10.1825).abs() < 1e-9);
    }
}
