//! Great-circle distance on a spherical Earth.

use super::types::Coordinate;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Computes the great-circle distance between two coordinates in meters.
///
/// Uses the haversine formula. The result is symmetric and zero for
/// coincident points. Accuracy and timestamps are ignored.
///
/// # Examples
///
/// ```
/// use danger_alert_core::geo::{distance, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
///
/// // One degree of longitude at the equator is ~111.2 km
/// assert!((distance(&a, &b) - 111_195.0).abs() < 1.0);
/// assert_eq!(distance(&a, &a), 0.0);
/// ```
#[must_use]
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    // Rounding can push h just past 1.0 for near-antipodal points.
    let h = ((delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Returns whether `point` lies within `radius` meters of `center`.
///
/// The boundary is inclusive.
#[must_use]
pub fn within_radius(center: &Coordinate, point: &Coordinate, radius: f64) -> bool {
    distance(center, point) <= radius
}

/// Renders a distance for display.
///
/// Below 1000 m the value is rounded to whole meters (`"850m"`); at or above
/// it is shown in kilometers with one decimal (`"1.2km"`).
///
/// # Examples
///
/// ```
/// use danger_alert_core::geo::format_distance;
///
/// assert_eq!(format_distance(849.6), "850m");
/// assert_eq!(format_distance(1_000.0), "1.0km");
/// assert_eq!(format_distance(12_345.0), "12.3km");
/// ```
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Coordinate {
        Coordinate::new(48.8566, 2.3522)
    }

    fn london() -> Coordinate {
        Coordinate::new(51.5074, -0.1278)
    }

    #[test]
    fn zero_for_coincident_points() {
        assert_eq!(distance(&paris(), &paris()), 0.0);
    }

    #[test]
    fn paris_to_london_is_about_344_km() {
        let d = distance(&paris(), &london());
        assert!((d - 343_500.0).abs() < 1_500.0, "got {d}");
    }

    #[test]
    fn symmetric() {
        assert_eq!(distance(&paris(), &london()), distance(&london(), &paris()));
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(11.0, 20.0);
        assert!((distance(&a, &b) - 111_195.0).abs() < 1.0);
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((distance(&a, &b) - half).abs() < 1.0);
    }

    #[test]
    fn ignores_accuracy_and_timestamp() {
        let plain = Coordinate::new(48.0, 2.0);
        let tagged = Coordinate::new(48.0, 2.0).with_accuracy(30.0);
        assert_eq!(distance(&plain, &tagged), 0.0);
    }

    #[test]
    fn within_radius_is_inclusive() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.01);
        let d = distance(&a, &b);
        assert!(within_radius(&a, &b, d));
        assert!(!within_radius(&a, &b, d - 0.001));
    }

    #[test]
    fn format_distance_meters() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(999.4), "999m");
    }

    #[test]
    fn format_distance_kilometers() {
        assert_eq!(format_distance(1_500.0), "1.5km");
        assert_eq!(format_distance(5_000.0), "5.0km");
    }
}
