//! Platform notification collaborator.

use async_trait::async_trait;

use super::error::Result;
use super::types::LocalNotification;

/// Delivers local notifications on the device.
///
/// Implemented by the host platform. Delivery is fire-and-forget from the
/// core's point of view: errors are logged by the caller and never undo the
/// change that triggered the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Schedules a local notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot schedule the notification.
    async fn schedule(&self, notification: LocalNotification) -> Result<()>;
}
