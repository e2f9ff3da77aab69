//! API bridging layer that exposes danger-alert-core to Flutter.
//!
//! Every call that needs the core's async runtime is driven by a runtime
//! owned by [`DangerAlert`]. The Flutter side pushes device positions in and
//! drains pending notifications out.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use danger_alert_core::danger::{DangerEvent, DangerSeverity, DangerStats, DangerType};
use danger_alert_core::geo::Coordinate;
use danger_alert_core::notification::{
    LocalNotification, NotificationPreferences, PreferencesUpdate,
};
use danger_alert_core::CoreConfig;
use flutter_rust_bridge::frb;
use tokio::runtime::Runtime;

use crate::platform::{DevicePosition, NotificationOutbox};

/// Core interface for Danger Alert functionality (wrapper around
/// `danger_alert_core::DangerAlertCore`).
#[frb(opaque)]
pub struct DangerAlert {
    inner: danger_alert_core::DangerAlertCore,
    device: Arc<DevicePosition>,
    outbox: Arc<NotificationOutbox>,
    // Declared last so the core's background tasks are dropped first.
    runtime: Runtime,
}

impl DangerAlert {
    /// Opens the danger database at `db_path` and starts the background tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built or the database
    /// cannot be opened.
    pub fn new(db_path: String) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to start runtime: {e}"))?;

        let device = Arc::new(DevicePosition::default());
        let outbox = Arc::new(NotificationOutbox::default());
        let mut inner = danger_alert_core::DangerAlertCore::open(
            Path::new(&db_path),
            Arc::clone(&device) as _,
            Arc::clone(&outbox) as _,
            CoreConfig::default(),
        )
        .map_err(|e| e.to_string())?;

        {
            let _guard = runtime.enter();
            inner.start_background_tasks();
        }

        Ok(Self {
            inner,
            device,
            outbox,
            runtime,
        })
    }

    /// Records the latest position fix from the geolocation plugin.
    #[frb(sync)]
    pub fn update_position(&self, latitude: f64, longitude: f64, accuracy: Option<f64>) {
        let mut position = Coordinate::new(latitude, longitude).with_timestamp(Utc::now());
        if let Some(accuracy) = accuracy {
            position = position.with_accuracy(accuracy);
        }
        self.device.update(position);
    }

    /// Records the outcome of the location permission prompt.
    #[frb(sync)]
    pub fn set_location_permission(&self, granted: bool) {
        self.device.set_permission(granted);
    }

    /// Returns whether location permission is granted.
    #[frb(sync)]
    #[must_use]
    pub fn has_location_permission(&self) -> bool {
        self.runtime.block_on(self.inner.has_location_permission())
    }

    /// Reports a danger at the last known device position.
    ///
    /// `danger_type` is the stored type name (`"accident"`, `"police"`, ...)
    /// and `severity` the scale index, 0 for low through 3 for critical.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or no position is available.
    pub fn report_danger(
        &self,
        danger_type: String,
        severity: u32,
        description: Option<String>,
        radius: Option<f64>,
    ) -> Result<String, String> {
        let danger_type = DangerType::parse(&danger_type)
            .ok_or_else(|| format!("Unknown danger type: {danger_type}"))?;
        let severity = DangerSeverity::from_index(severity as usize);
        self.runtime
            .block_on(
                self.inner
                    .submit_report(danger_type, severity, description, radius),
            )
            .map_err(|e| e.to_string())
    }

    /// Adds a confirmation to a danger. Returns `false` for unknown ids.
    #[frb(sync)]
    pub fn confirm_danger(&self, id: String) -> bool {
        self.inner.registry().confirm(&id)
    }

    /// Marks a danger inactive. Returns `false` for unknown ids.
    #[frb(sync)]
    pub fn dismiss_danger(&self, id: String) -> bool {
        self.inner.registry().dismiss(&id)
    }

    /// Returns the active dangers.
    #[frb(sync)]
    #[must_use]
    pub fn active_dangers(&self) -> Vec<DangerView> {
        self.inner
            .registry()
            .snapshot()
            .iter()
            .cloned()
            .map(DangerView::from)
            .collect()
    }

    /// Returns the active dangers within `radius` meters of a point.
    #[frb(sync)]
    #[must_use]
    pub fn dangers_near(&self, latitude: f64, longitude: f64, radius: f64) -> Vec<DangerView> {
        self.inner
            .registry()
            .nearby(&Coordinate::new(latitude, longitude), radius)
            .into_iter()
            .map(DangerView::from)
            .collect()
    }

    /// Returns counts of all stored dangers.
    #[frb(sync)]
    #[must_use]
    pub fn stats(&self) -> DangerStatsView {
        DangerStatsView {
            inner: self.inner.registry().stats(),
        }
    }

    /// Removes every stored danger.
    #[frb(sync)]
    pub fn clear_all(&self) {
        self.inner.registry().clear_all();
    }

    /// Gets the notification settings.
    #[frb(sync)]
    #[must_use]
    pub fn get_notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            inner: self.inner.notifications().preferences().current(),
        }
    }

    /// Replaces the notification settings.
    #[frb(sync)]
    pub fn set_notification_settings(&self, settings: NotificationSettings) {
        let s = settings.inner;
        self.inner
            .notifications()
            .preferences()
            .update(PreferencesUpdate {
                enabled: Some(s.enabled),
                danger_types: Some(s.danger_types),
                max_distance: Some(s.max_distance),
                min_severity: Some(s.min_severity),
                sound_enabled: Some(s.sound_enabled),
                vibration_enabled: Some(s.vibration_enabled),
            });
    }

    /// Queues a fixed test notification. Returns whether it passed the
    /// user's settings.
    pub fn send_test_notification(&self) -> bool {
        self.runtime
            .block_on(self.inner.notifications().send_test_notification())
    }

    /// Removes and returns the notifications waiting to be scheduled.
    #[frb(sync)]
    #[must_use]
    pub fn take_pending_notifications(&self) -> Vec<PendingNotification> {
        self.outbox
            .drain()
            .into_iter()
            .map(|inner| PendingNotification { inner })
            .collect()
    }
}

impl std::fmt::Debug for DangerAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DangerAlert")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// A registered danger (FFI wrapper).
#[derive(Debug, Clone)]
#[frb(opaque)]
pub struct DangerView {
    inner: DangerEvent,
}

impl From<DangerEvent> for DangerView {
    fn from(inner: DangerEvent) -> Self {
        Self { inner }
    }
}

impl DangerView {
    /// Gets the danger id.
    #[frb(sync)]
    #[must_use]
    pub fn id(&self) -> String {
        self.inner.id.clone()
    }

    /// Gets the stored type name.
    #[frb(sync)]
    #[must_use]
    pub fn danger_type(&self) -> String {
        self.inner.danger_type.as_str().to_string()
    }

    /// Gets the display label of the type.
    #[frb(sync)]
    #[must_use]
    pub fn type_label(&self) -> String {
        self.inner.danger_type.label().to_string()
    }

    /// Gets the severity scale index, 0 for low through 3 for critical.
    #[frb(sync)]
    #[must_use]
    pub fn severity(&self) -> u32 {
        saturating_u32(self.inner.severity.index())
    }

    /// Gets the display label of the severity.
    #[frb(sync)]
    #[must_use]
    pub fn severity_label(&self) -> String {
        self.inner.severity.label().to_string()
    }

    /// Gets the latitude.
    #[frb(sync)]
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.inner.position.latitude
    }

    /// Gets the longitude.
    #[frb(sync)]
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.inner.position.longitude
    }

    /// Gets the description, if any.
    #[frb(sync)]
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.inner.description.clone()
    }

    /// Gets the report time as Unix timestamp (seconds since epoch).
    #[frb(sync)]
    #[must_use]
    pub fn reported_at(&self) -> i64 {
        self.inner.reported_at.timestamp()
    }

    /// Gets the expiration time as Unix timestamp (seconds since epoch).
    #[frb(sync)]
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.inner.expires_at.map(|t| t.timestamp())
    }

    /// Gets the number of reports for this danger.
    #[frb(sync)]
    #[must_use]
    pub fn report_count(&self) -> u32 {
        self.inner.report_count
    }

    /// Gets the alert radius in meters.
    #[frb(sync)]
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.inner.radius
    }

    /// Gets a relative age label such as "5 min ago".
    #[frb(sync)]
    #[must_use]
    pub fn age_label(&self) -> String {
        self.inner.age_label(Utc::now())
    }

    /// Gets a distance label from a point, such as "850m" or "1.2km".
    #[frb(sync)]
    #[must_use]
    pub fn distance_label(&self, latitude: f64, longitude: f64) -> String {
        self.inner
            .distance_label_from(&Coordinate::new(latitude, longitude))
    }
}

/// Danger counts (FFI wrapper).
#[derive(Debug, Clone)]
#[frb(opaque)]
pub struct DangerStatsView {
    inner: DangerStats,
}

impl DangerStatsView {
    /// Gets the number of stored dangers.
    #[frb(sync)]
    #[must_use]
    pub fn total(&self) -> u32 {
        saturating_u32(self.inner.total)
    }

    /// Gets the number of dangers of a stored type name.
    #[frb(sync)]
    #[must_use]
    pub fn count_for_type(&self, danger_type: String) -> u32 {
        DangerType::parse(&danger_type)
            .and_then(|t| self.inner.by_type.get(&t).copied())
            .map_or(0, saturating_u32)
    }

    /// Gets the number of active dangers.
    #[frb(sync)]
    #[must_use]
    pub fn active(&self) -> u32 {
        saturating_u32(self.inner.by_status.active)
    }

    /// Gets the number of dismissed dangers.
    #[frb(sync)]
    #[must_use]
    pub fn inactive(&self) -> u32 {
        saturating_u32(self.inner.by_status.inactive)
    }

    /// Gets the number of expired dangers not yet swept.
    #[frb(sync)]
    #[must_use]
    pub fn expired(&self) -> u32 {
        saturating_u32(self.inner.by_status.expired)
    }
}

/// Notification settings (FFI wrapper).
#[derive(Debug, Clone)]
#[frb(opaque)]
pub struct NotificationSettings {
    inner: NotificationPreferences,
}

impl NotificationSettings {
    /// Creates notification settings.
    ///
    /// Unknown type names are ignored.
    #[must_use]
    pub fn new(
        enabled: bool,
        danger_types: Vec<String>,
        max_distance: f64,
        min_severity: u32,
        sound_enabled: bool,
        vibration_enabled: bool,
    ) -> Self {
        Self {
            inner: NotificationPreferences {
                enabled,
                danger_types: danger_types
                    .iter()
                    .filter_map(|t| DangerType::parse(t))
                    .collect(),
                max_distance,
                min_severity: DangerSeverity::from_index(min_severity as usize),
                sound_enabled,
                vibration_enabled,
            },
        }
    }

    /// Gets whether notifications are enabled.
    #[frb(sync)]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Gets the stored names of the types that notify.
    #[frb(sync)]
    #[must_use]
    pub fn danger_types(&self) -> Vec<String> {
        self.inner
            .danger_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    /// Gets the maximum notification distance in meters.
    #[frb(sync)]
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.inner.max_distance
    }

    /// Gets the minimum severity index.
    #[frb(sync)]
    #[must_use]
    pub fn min_severity(&self) -> u32 {
        saturating_u32(self.inner.min_severity.index())
    }

    /// Gets whether notifications play a sound.
    #[frb(sync)]
    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.inner.sound_enabled
    }

    /// Gets whether notifications vibrate.
    #[frb(sync)]
    #[must_use]
    pub fn vibration_enabled(&self) -> bool {
        self.inner.vibration_enabled
    }
}

/// A notification waiting for the Flutter plugin (FFI wrapper).
#[derive(Debug, Clone)]
#[frb(opaque)]
pub struct PendingNotification {
    inner: LocalNotification,
}

impl PendingNotification {
    /// Gets the platform notification id.
    #[frb(sync)]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.inner.id
    }

    /// Gets the title.
    #[frb(sync)]
    #[must_use]
    pub fn title(&self) -> String {
        self.inner.title.clone()
    }

    /// Gets the body.
    #[frb(sync)]
    #[must_use]
    pub fn body(&self) -> String {
        self.inner.body.clone()
    }

    /// Gets the delivery time as Unix timestamp in milliseconds.
    #[frb(sync)]
    #[must_use]
    pub fn schedule_at_millis(&self) -> i64 {
        self.inner.schedule_at.timestamp_millis()
    }

    /// Gets the sound file, if the notification plays one.
    #[frb(sync)]
    #[must_use]
    pub fn sound(&self) -> Option<String> {
        self.inner.sound.clone()
    }

    /// Gets the action type id.
    #[frb(sync)]
    #[must_use]
    pub fn action_type_id(&self) -> String {
        self.inner.action_type_id.clone()
    }

    /// Gets the stored type name of the danger.
    #[frb(sync)]
    #[must_use]
    pub fn danger_type(&self) -> String {
        self.inner.extra.danger_type.as_str().to_string()
    }

    /// Gets the danger latitude.
    #[frb(sync)]
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.inner.extra.latitude
    }

    /// Gets the danger longitude.
    #[frb(sync)]
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.inner.extra.longitude
    }

    /// Gets the distance to the danger in meters.
    #[frb(sync)]
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.inner.extra.distance
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
