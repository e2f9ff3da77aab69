//! Notification filtering and formatting.
//!
//! Pure functions shared by the notification service and the registry.

use rand::Rng;

use super::types::NotificationPreferences;
use crate::danger::{DangerSeverity, DangerType};
use crate::geo::format_distance;

/// Decides whether a danger should produce a notification.
///
/// Returns `false` when notifications are disabled, when the type is not
/// among the enabled types, when the danger is further than the maximum
/// distance, or when its severity is below the threshold.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use danger_alert_core::danger::{DangerSeverity, DangerType};
/// use danger_alert_core::notification::{should_notify, NotificationPreferences};
///
/// let prefs = NotificationPreferences {
///     danger_types: BTreeSet::from([DangerType::Accident]),
///     max_distance: 1_000.0,
///     min_severity: DangerSeverity::Medium,
///     ..NotificationPreferences::default()
/// };
///
/// assert!(should_notify(&prefs, DangerType::Accident, DangerSeverity::High, 500.0));
/// assert!(!should_notify(&prefs, DangerType::Weather, DangerSeverity::High, 500.0));
/// ```
#[must_use]
pub fn should_notify(
    preferences: &NotificationPreferences,
    danger_type: DangerType,
    severity: DangerSeverity,
    distance: f64,
) -> bool {
    preferences.enabled
        && preferences.danger_types.contains(&danger_type)
        && distance <= preferences.max_distance
        && severity.ordinal() >= preferences.min_severity.ordinal()
}

/// Formats a notification title: the type label and the distance.
///
/// # Examples
///
/// ```
/// use danger_alert_core::danger::DangerType;
/// use danger_alert_core::notification::format_title;
///
/// assert_eq!(format_title(DangerType::RoadWork, 420.0), "Road work at 420m");
/// assert_eq!(format_title(DangerType::Weather, 3_260.0), "Weather conditions at 3.3km");
/// ```
#[must_use]
pub fn format_title(danger_type: DangerType, distance: f64) -> String {
    format!("{} at {}", danger_type.label(), format_distance(distance))
}

/// Formats a notification body: the severity line, then the description.
///
/// Takes the same danger type as [`format_title`] so both parts of a
/// notification are built from one set of arguments. The type itself does
/// not appear in the body; the title already names it. Empty descriptions
/// are treated as absent.
#[must_use]
pub fn format_body(
    _danger_type: DangerType,
    severity: DangerSeverity,
    description: Option<&str>,
) -> String {
    let mut body = format!("Severity: {}", severity.label());
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        body.push('\n');
        body.push_str(description);
    }
    body
}

/// Derives the numeric platform identifier for a danger id.
///
/// Uses the first nine digits found in the id. Ids without digits (or whose
/// digits are all zero) get a random identifier below 1,000,000.
#[must_use]
pub fn notification_id(danger_id: &str) -> i32 {
    let digits: String = danger_id
        .chars()
        .filter(char::is_ascii_digit)
        .take(9)
        .collect();

    digits
        .parse::<i32>()
        .ok()
        .filter(|id| *id != 0)
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..1_000_000))
}
