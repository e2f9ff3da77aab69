//! Proximity notifications.
//!
//! Decides whether a danger should produce a local notification, formats
//! it, and hands it to the platform through the [`Notifier`] trait.
//!
//! # Architecture
//!
//! ```text
//! NotificationService (high-level API)
//!     ├── PreferencesStore (persisted user preferences)
//!     ├── gate (should_notify, format_title, format_body)
//!     └── Notifier (platform delivery, implemented by the host)
//! ```
//!
//! # Example Usage
//!
//! ```
//! use danger_alert_core::danger::{DangerSeverity, DangerType};
//! use danger_alert_core::notification::{format_title, should_notify, NotificationPreferences};
//!
//! let prefs = NotificationPreferences::default();
//! assert!(should_notify(&prefs, DangerType::Accident, DangerSeverity::High, 500.0));
//! assert_eq!(format_title(DangerType::Police, 800.0), "Police check at 800m");
//! ```

mod error;
pub mod gate;
mod notifier;
mod preferences;
mod service;
pub mod types;

pub use error::{NotificationError, Result};
pub use gate::{format_body, format_title, notification_id, should_notify};
pub use notifier::Notifier;
pub use preferences::PreferencesStore;
pub use service::NotificationService;
pub use types::{
    LocalNotification, NotificationCandidate, NotificationExtra, NotificationPreferences,
    PreferencesUpdate, DANGER_ALERT_ACTION, NOTIFICATION_SOUND,
};
