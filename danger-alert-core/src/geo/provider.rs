//! Device position collaborator.

use async_trait::async_trait;

use super::error::Result;
use super::types::Coordinate;

/// Source of the device's current position.
///
/// Implemented by the host platform (the Flutter bridge, or a mock in tests).
/// A failure is returned to foreground callers such as report submission and
/// swallowed by background work.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Acquires the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if permission is denied, no fix is available,
    /// or acquisition times out.
    async fn current_position(&self) -> Result<Coordinate>;

    /// Asks the user for location permission. Returns whether it was granted.
    async fn request_permissions(&self) -> bool;

    /// Returns whether location permission is currently granted.
    async fn check_permissions(&self) -> bool;
}
