//! Error types for notification delivery.

use thiserror::Error;

/// Error type for notification operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The platform refused or failed to schedule the notification.
    #[error("Failed to dispatch notification: {0}")]
    Dispatch(String),

    /// The user has not granted notification permission.
    #[error("Notification permission denied")]
    PermissionDenied,
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotificationError>;
