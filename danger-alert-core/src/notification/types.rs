//! Notification data types.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::gate::{format_body, format_title, notification_id};
use crate::danger::{DangerEvent, DangerSeverity, DangerType};

/// Sound file played with danger notifications when sound is enabled.
pub const NOTIFICATION_SOUND: &str = "beep.wav";

/// Action type registered with the platform for danger notifications.
pub const DANGER_ALERT_ACTION: &str = "DANGER_ALERT";

/// User preferences controlling which dangers produce notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Master switch
    pub enabled: bool,

    /// Danger types the user wants to hear about
    pub danger_types: BTreeSet<DangerType>,

    /// Dangers further away than this are ignored, in meters
    pub max_distance: f64,

    /// Dangers below this severity are ignored
    pub min_severity: DangerSeverity,

    /// Play a sound with notifications
    pub sound_enabled: bool,

    /// Vibrate with notifications
    pub vibration_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            danger_types: DangerType::ALL.into_iter().collect(),
            max_distance: 5_000.0,
            min_severity: DangerSeverity::Low,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl NotificationPreferences {
    /// Returns these preferences with `update` merged on top.
    #[must_use]
    pub fn merged(self, update: PreferencesUpdate) -> Self {
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            danger_types: update.danger_types.unwrap_or(self.danger_types),
            max_distance: update.max_distance.unwrap_or(self.max_distance),
            min_severity: update.min_severity.unwrap_or(self.min_severity),
            sound_enabled: update.sound_enabled.unwrap_or(self.sound_enabled),
            vibration_enabled: update.vibration_enabled.unwrap_or(self.vibration_enabled),
        }
    }
}

/// Partial update of [`NotificationPreferences`]. `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesUpdate {
    /// New master switch
    pub enabled: Option<bool>,
    /// New set of danger types
    pub danger_types: Option<BTreeSet<DangerType>>,
    /// New maximum distance, in meters
    pub max_distance: Option<f64>,
    /// New severity threshold
    pub min_severity: Option<DangerSeverity>,
    /// New sound flag
    pub sound_enabled: Option<bool>,
    /// New vibration flag
    pub vibration_enabled: Option<bool>,
}

/// A notification about to be considered for delivery.
///
/// Built per attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationCandidate {
    /// Identifier of the danger event
    pub id: String,
    /// Formatted title
    pub title: String,
    /// Formatted body
    pub body: String,
    /// Category of the danger
    pub danger_type: DangerType,
    /// Severity of the danger
    pub severity: DangerSeverity,
    /// Latitude of the danger
    pub latitude: f64,
    /// Longitude of the danger
    pub longitude: f64,
    /// Distance from the device to the danger, in meters
    pub distance: f64,
    /// When the candidate was built
    pub timestamp: DateTime<Utc>,
}

impl NotificationCandidate {
    /// Builds the candidate for `event` seen from `distance` meters away.
    #[must_use]
    pub fn for_event(event: &DangerEvent, distance: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id.clone(),
            title: format_title(event.danger_type, distance),
            body: format_body(
                event.danger_type,
                event.severity,
                event.description.as_deref(),
            ),
            danger_type: event.danger_type,
            severity: event.severity,
            latitude: event.position.latitude,
            longitude: event.position.longitude,
            distance,
            timestamp: now,
        }
    }

    /// Fixed candidate used by the settings screen to test delivery.
    #[must_use]
    pub fn test(now: DateTime<Utc>) -> Self {
        Self {
            id: "test".to_string(),
            title: "Test notification".to_string(),
            body: "This is a test notification to check that alerts work.".to_string(),
            danger_type: DangerType::Other,
            severity: DangerSeverity::Medium,
            latitude: 0.0,
            longitude: 0.0,
            distance: 500.0,
            timestamp: now,
        }
    }
}

/// Extra data attached to a platform notification, returned when tapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationExtra {
    /// Category of the danger
    pub danger_type: DangerType,
    /// Latitude of the danger
    pub latitude: f64,
    /// Longitude of the danger
    pub longitude: f64,
    /// Distance at notification time, in meters
    pub distance: f64,
}

/// Payload handed to the platform notification plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNotification {
    /// Numeric platform identifier
    pub id: i32,
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// When the platform should show it
    pub schedule_at: DateTime<Utc>,
    /// Sound file, when sound is enabled
    pub sound: Option<String>,
    /// Registered action type
    pub action_type_id: String,
    /// Data returned when the user taps the notification
    pub extra: NotificationExtra,
}

impl LocalNotification {
    /// Builds the platform payload for `candidate`, scheduled one second after `now`.
    #[must_use]
    pub fn from_candidate(
        candidate: &NotificationCandidate,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: notification_id(&candidate.id),
            title: candidate.title.clone(),
            body: candidate.body.clone(),
            schedule_at: now + Duration::seconds(1),
            sound: preferences
                .sound_enabled
                .then(|| NOTIFICATION_SOUND.to_string()),
            action_type_id: DANGER_ALERT_ACTION.to_string(),
            extra: NotificationExtra {
                danger_type: candidate.danger_type,
                latitude: candidate.latitude,
                longitude: candidate.longitude,
                distance: candidate.distance,
            },
        }
    }
}
