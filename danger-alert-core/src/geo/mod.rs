//! Geographic primitives for Danger Alert.
//!
//! Provides:
//! - [`Coordinate`], the position type shared by reports, events and the
//!   device location provider
//! - Great-circle distance using the haversine formula
//! - Human-readable distance labels ("850m", "1.2km")
//! - The [`PositionProvider`] trait implemented by the host platform
//!
//! # Example Usage
//!
//! ```
//! use danger_alert_core::geo::{distance, format_distance, within_radius, Coordinate};
//!
//! let paris = Coordinate::new(48.8566, 2.3522);
//! let louvre = Coordinate::new(48.8606, 2.3376);
//!
//! let meters = distance(&paris, &louvre);
//! assert!(meters > 1_000.0 && meters < 1_300.0);
//! assert!(within_radius(&paris, &louvre, 2_000.0));
//! assert_eq!(format_distance(meters), format!("{:.1}km", meters / 1000.0));
//! ```

pub mod distance;
mod error;
mod provider;
pub mod types;

pub use distance::{distance, format_distance, within_radius, EARTH_RADIUS_METERS};
pub use error::{LocationError, Result};
pub use provider::PositionProvider;
pub use types::Coordinate;
