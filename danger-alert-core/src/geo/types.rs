//! Coordinate type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A position on the Earth's surface in decimal degrees.
///
/// Range validity is reported by [`Coordinate::is_valid`] but never enforced:
/// the device location plugin is trusted to supply sane values.
///
/// # Example
///
/// ```
/// use danger_alert_core::geo::Coordinate;
///
/// let position = Coordinate::new(48.8566, 2.3522).with_accuracy(12.0);
/// assert!(position.is_valid());
/// assert_eq!(position.accuracy, Some(12.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90.0 to 90.0)
    pub latitude: f64,

    /// Longitude in degrees (-180.0 to 180.0)
    pub longitude: f64,

    /// Horizontal accuracy reported by the device, in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// When the position was captured (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Coordinate {
    /// Creates a coordinate without accuracy or capture time.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: None,
        }
    }

    /// Attaches the device-reported accuracy in meters.
    #[must_use]
    pub const fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Attaches the capture timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns whether both components are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_no_metadata() {
        let coord = Coordinate::new(48.8566, 2.3522);
        assert!(coord.accuracy.is_none());
        assert!(coord.timestamp.is_none());
    }

    #[test]
    fn builders_attach_metadata() {
        let now = Utc::now();
        let coord = Coordinate::new(1.0, 2.0)
            .with_accuracy(5.0)
            .with_timestamp(now);
        assert_eq!(coord.accuracy, Some(5.0));
        assert_eq!(coord.timestamp, Some(now));
    }

    #[test]
    fn accepts_valid_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(Coordinate::new(0.0, 0.0).is_valid());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -181.0).is_valid());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn json_omits_missing_metadata() {
        let json = serde_json::to_string(&Coordinate::new(1.5, -2.5)).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-2.5}"#);

        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Coordinate::new(1.5, -2.5));
    }
}
