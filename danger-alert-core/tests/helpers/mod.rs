//! Reusable test collaborators for registry and notification tests.
//!
//! The mocks stand in for the platform plugins: a position provider whose
//! position the test controls, and a notifier that records what it was asked
//! to deliver.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use danger_alert_core::danger::{DangerRegistry, DangerReport, DangerSeverity, DangerType};
use danger_alert_core::geo::{self, Coordinate, LocationError, PositionProvider};
use danger_alert_core::notification::{
    LocalNotification, NotificationError, NotificationService, Notifier, PreferencesStore,
};
use danger_alert_core::storage::{self, KeyValueStore, SqliteStore, StorageError};
use danger_alert_core::CoreConfig;

/// Central Paris, used as the default device position.
pub const PARIS: Coordinate = Coordinate::new(48.8566, 2.3522);

/// Position provider whose answer the test sets.
#[derive(Default)]
pub struct MockPositionProvider {
    position: Mutex<Option<Coordinate>>,
    calls: AtomicUsize,
}

impl MockPositionProvider {
    /// Provider that always answers `position`.
    pub fn at(position: Coordinate) -> Self {
        Self {
            position: Mutex::new(Some(position)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that always fails with `PermissionDenied`.
    pub fn denied() -> Self {
        Self::default()
    }

    /// Moves the device.
    pub fn set(&self, position: Option<Coordinate>) {
        *self.position.lock().unwrap() = position;
    }

    /// Number of `current_position` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionProvider for MockPositionProvider {
    async fn current_position(&self) -> geo::Result<Coordinate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (*self.position.lock().unwrap()).ok_or(LocationError::PermissionDenied)
    }

    async fn request_permissions(&self) -> bool {
        self.position.lock().unwrap().is_some()
    }

    async fn check_permissions(&self) -> bool {
        self.position.lock().unwrap().is_some()
    }
}

/// Notifier that records every notification, optionally failing instead.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<LocalNotification>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    /// Notifier whose every dispatch fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<LocalNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of dispatch attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn schedule(
        &self,
        notification: LocalNotification,
    ) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotificationError::Dispatch("plugin unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Store whose every read and write fails, like a locked or corrupt database.
#[derive(Default)]
pub struct FailingStore {
    writes: AtomicUsize,
}

impl FailingStore {
    /// Number of `set` and `remove` calls attempted.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> storage::Result<Option<String>> {
        Err(StorageError::Lock("database is locked".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> storage::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Lock("database is locked".to_string()))
    }

    fn remove(&self, _key: &str) -> storage::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Lock("database is locked".to_string()))
    }
}

/// A registry wired to mocks, with handles the test can inspect.
pub struct Harness {
    pub store: Arc<SqliteStore>,
    pub positions: Arc<MockPositionProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub notifications: Arc<NotificationService>,
    pub registry: DangerRegistry,
}

impl Harness {
    /// Fresh harness over an empty in-memory database, device in Paris.
    pub fn new() -> Self {
        Self::with_store(Arc::new(SqliteStore::in_memory().expect("in-memory store")))
    }

    /// Harness over an existing store, device in Paris.
    pub fn with_store(store: Arc<SqliteStore>) -> Self {
        Self::build(
            store,
            Arc::new(MockPositionProvider::at(PARIS)),
            Arc::new(RecordingNotifier::default()),
        )
    }

    /// Harness with explicit collaborators.
    pub fn build(
        store: Arc<SqliteStore>,
        positions: Arc<MockPositionProvider>,
        notifier: Arc<RecordingNotifier>,
    ) -> Self {
        let config = CoreConfig::default();
        let shared: Arc<dyn KeyValueStore> = store.clone();
        let preferences = PreferencesStore::load(Arc::clone(&shared), config.preferences_key.clone());
        let notifications = Arc::new(NotificationService::new(preferences, notifier.clone()));
        let registry = DangerRegistry::load(
            shared,
            positions.clone(),
            Arc::clone(&notifications),
            config,
        );

        Self {
            store,
            positions,
            notifier,
            notifications,
            registry,
        }
    }

    /// Reloads a registry from this harness's store, as after an app restart.
    pub fn reload(&self) -> DangerRegistry {
        let shared: Arc<dyn KeyValueStore> = self.store.clone();
        DangerRegistry::load(
            shared,
            self.positions.clone(),
            Arc::clone(&self.notifications),
            CoreConfig::default(),
        )
    }
}

/// Report of `danger_type` at `position` with medium severity.
pub fn report_at(danger_type: DangerType, position: Coordinate) -> DangerReport {
    DangerReport::new(danger_type, DangerSeverity::Medium, position)
}

/// A coordinate roughly `meters` north of `origin`.
pub fn north_of(origin: Coordinate, meters: f64) -> Coordinate {
    let degrees = meters / geo::EARTH_RADIUS_METERS * (180.0 / std::f64::consts::PI);
    Coordinate::new(origin.latitude + degrees, origin.longitude)
}
