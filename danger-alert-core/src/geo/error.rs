//! Error types for position acquisition.

use thiserror::Error;

/// Errors reported by a [`PositionProvider`](super::PositionProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user denied location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not produce a position.
    #[error("Position unavailable: {0}")]
    Unavailable(String),

    /// No fix was obtained in time.
    #[error("Timed out waiting for position after {0} ms")]
    Timeout(u64),
}

/// Result type alias for location operations.
pub type Result<T> = std::result::Result<T, LocationError>;
