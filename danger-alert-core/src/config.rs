//! Runtime configuration for the core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Storage key of the danger collection blob.
pub const DEFAULT_DANGERS_KEY: &str = "dangers";

/// Storage key of the notification preferences blob.
pub const DEFAULT_PREFERENCES_KEY: &str = "notificationSettings";

/// Tunables for the registry, notifications and background tasks.
///
/// Every field has a default, so a partial JSON document is a valid config.
///
/// # Example
///
/// ```
/// use danger_alert_core::CoreConfig;
///
/// let config = CoreConfig::from_json(r#"{"sweep_interval_secs": 10}"#).unwrap();
/// assert_eq!(config.sweep_interval().as_secs(), 10);
/// assert_eq!(config.proximity_check_interval().as_secs(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Seconds between expiration sweeps
    pub sweep_interval_secs: u64,

    /// Seconds between proximity checks
    pub proximity_check_interval_secs: u64,

    /// Radius of the periodic proximity check, in meters
    pub proximity_radius: f64,

    /// Reporters closer than this to their own report are not notified, in meters
    pub self_notification_radius: f64,

    /// Storage key for the danger collection
    pub dangers_key: String,

    /// Storage key for the notification preferences
    pub preferences_key: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
            proximity_check_interval_secs: 30,
            proximity_radius: 5_000.0,
            self_notification_radius: 100.0,
            dangers_key: DEFAULT_DANGERS_KEY.to_string(),
            preferences_key: DEFAULT_PREFERENCES_KEY.to_string(),
        }
    }
}

/// Shortest interval a background task may run at, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 1;

impl CoreConfig {
    /// Interval between expiration sweeps, at least [`MIN_INTERVAL_SECS`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        interval_from_secs(self.sweep_interval_secs)
    }

    /// Interval between proximity checks, at least [`MIN_INTERVAL_SECS`].
    #[must_use]
    pub const fn proximity_check_interval(&self) -> Duration {
        interval_from_secs(self.proximity_check_interval_secs)
    }

    /// Parses a config from JSON, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this config to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (extremely rare).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

const fn interval_from_secs(secs: u64) -> Duration {
    // tokio::time::interval panics on a zero period.
    if secs < MIN_INTERVAL_SECS {
        Duration::from_secs(MIN_INTERVAL_SECS)
    } else {
        Duration::from_secs(secs)
    }
}
