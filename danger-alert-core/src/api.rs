//! Application-wide context object.

use std::path::Path;
use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use crate::config::CoreConfig;
use crate::danger::{DangerRegistry, DangerReport, DangerSeverity, DangerType, Result};
use crate::geo::PositionProvider;
use crate::notification::{NotificationService, Notifier, PreferencesStore};
use crate::storage::{KeyValueStore, SqliteStore, StorageError};

/// Core interface for Danger Alert functionality.
///
/// Built once at process start and passed by reference to every screen.
/// Owns the danger registry, the notification service and, once started,
/// the background sweep and proximity tasks.
///
/// # Example
///
/// ```ignore
/// use danger_alert_core::{CoreConfig, DangerAlertCore};
///
/// let core = DangerAlertCore::open(&db_path, positions, notifier, CoreConfig::default())?;
/// core.start_background_tasks();
///
/// let id = core
///     .submit_report(DangerType::Police, DangerSeverity::Medium, None, None)
///     .await?;
/// ```
pub struct DangerAlertCore {
    registry: Arc<DangerRegistry>,
    notifications: Arc<NotificationService>,
    positions: Arc<dyn PositionProvider>,
    config: CoreConfig,
    tasks: Option<BackgroundTasks>,
}

impl DangerAlertCore {
    /// Creates the core over an existing key-value store.
    ///
    /// Loads the danger collection and the notification preferences.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        positions: Arc<dyn PositionProvider>,
        notifier: Arc<dyn Notifier>,
        config: CoreConfig,
    ) -> Self {
        let preferences = PreferencesStore::load(Arc::clone(&store), config.preferences_key.clone());
        let notifications = Arc::new(NotificationService::new(preferences, notifier));
        let registry = Arc::new(DangerRegistry::load(
            store,
            Arc::clone(&positions),
            Arc::clone(&notifications),
            config.clone(),
        ));

        Self {
            registry,
            notifications,
            positions,
            config,
            tasks: None,
        }
    }

    /// Creates the core backed by an `SQLite` database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(
        db_path: &Path,
        positions: Arc<dyn PositionProvider>,
        notifier: Arc<dyn Notifier>,
        config: CoreConfig,
    ) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::from)?;
        }
        let store = Arc::new(SqliteStore::new(db_path)?);
        Ok(Self::new(store, positions, notifier, config))
    }

    /// The danger registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<DangerRegistry> {
        &self.registry
    }

    /// The notification service.
    #[must_use]
    pub const fn notifications(&self) -> &Arc<NotificationService> {
        &self.notifications
    }

    /// The configuration the core was built with.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Reports a danger at the device's current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the current position cannot be acquired. Nothing
    /// is registered in that case.
    pub async fn submit_report(
        &self,
        danger_type: DangerType,
        severity: DangerSeverity,
        description: Option<String>,
        radius: Option<f64>,
    ) -> Result<String> {
        let position = self.positions.current_position().await?;
        let report = DangerReport {
            danger_type,
            severity,
            position,
            description: description.filter(|d| !d.trim().is_empty()),
            radius,
        };
        Ok(self.registry.report(report).await)
    }

    /// Asks the user for location permission.
    pub async fn request_location_permission(&self) -> bool {
        self.positions.request_permissions().await
    }

    /// Returns whether location permission is granted.
    pub async fn has_location_permission(&self) -> bool {
        self.positions.check_permissions().await
    }

    /// Starts the expiration sweep and the proximity check.
    ///
    /// Must be called from within a tokio runtime. Calling it again while
    /// the tasks run is a no-op.
    pub fn start_background_tasks(&mut self) {
        if self.tasks.is_none() {
            self.tasks = Some(BackgroundTasks::spawn(Arc::clone(&self.registry), &self.config));
        }
    }

    /// Returns whether background tasks are running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.tasks.is_some()
    }

    /// Stops the background tasks.
    pub fn shutdown(&mut self) {
        if let Some(tasks) = self.tasks.take() {
            tasks.abort();
        }
    }
}

impl std::fmt::Debug for DangerAlertCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DangerAlertCore")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Handles of the periodic registry tasks. Dropping it stops them.
#[derive(Debug)]
pub struct BackgroundTasks {
    sweep: JoinHandle<()>,
    proximity: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Spawns the sweep and proximity loops on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(registry: Arc<DangerRegistry>, config: &CoreConfig) -> Self {
        let sweep_registry = Arc::clone(&registry);
        let sweep_interval = config.sweep_interval();
        let sweep = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // The first tick completes immediately; the first sweep waits a full interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep_registry.sweep_expired();
            }
        });

        let proximity_interval = config.proximity_check_interval();
        let proximity = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(proximity_interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.check_proximity().await;
            }
        });

        info!(
            "Background tasks started (sweep every {}s, proximity every {}s)",
            sweep_interval.as_secs(),
            proximity_interval.as_secs()
        );
        Self { sweep, proximity }
    }

    /// Stops both tasks.
    pub fn abort(&self) {
        self.sweep.abort();
        self.proximity.abort();
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.abort();
    }
}
