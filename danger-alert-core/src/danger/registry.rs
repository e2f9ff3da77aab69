//! In-memory danger registry with local persistence.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rand::RngCore;
use tokio::sync::broadcast;

use super::feed::{ActiveEvents, DangerFeed, Snapshot};
use super::types::{DangerEvent, DangerReport, DangerStats};
use crate::config::CoreConfig;
use crate::geo::{self, Coordinate, PositionProvider};
use crate::notification::{NotificationCandidate, NotificationService};
use crate::storage::{KeyValueStore, StorageError};

/// Owner of every reported danger.
///
/// All mutations run to completion under a single lock: the collection is
/// updated, persisted and published before any other caller can observe it.
/// No lock is held across an `.await`.
///
/// # Example
///
/// ```ignore
/// let registry = DangerRegistry::load(store, positions, notifications, CoreConfig::default());
/// let id = registry.report(report).await;
/// registry.confirm(&id);
/// let nearby = registry.nearby(&position, 2_000.0);
/// ```
pub struct DangerRegistry {
    events: Mutex<Vec<DangerEvent>>,
    store: Arc<dyn KeyValueStore>,
    positions: Arc<dyn PositionProvider>,
    notifications: Arc<NotificationService>,
    feed: DangerFeed,
    config: CoreConfig,
}

impl DangerRegistry {
    /// Loads the registry from `store`.
    ///
    /// Events that expired while the app was closed are dropped and the
    /// trimmed collection is written back. A missing, unreadable or corrupt
    /// blob yields an empty registry; the failure is logged.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        positions: Arc<dyn PositionProvider>,
        notifications: Arc<NotificationService>,
        config: CoreConfig,
    ) -> Self {
        let stored = read_events(store.as_ref(), &config.dangers_key);
        let stored_count = stored.len();

        let now = Utc::now();
        let events: Vec<DangerEvent> = stored
            .into_iter()
            .filter(|event| !event.is_expired_at(now))
            .collect();

        let registry = Self {
            events: Mutex::new(Vec::new()),
            store,
            positions,
            notifications,
            feed: DangerFeed::new(),
            config,
        };

        if events.len() == stored_count {
            *registry.lock_events() = events;
        } else {
            info!(
                "Dropped {} expired danger(s) on load",
                stored_count - events.len()
            );
            let mut guard = registry.lock_events();
            *guard = events;
            registry.commit(&guard);
        }

        registry
    }

    // ==================== Mutations ====================

    /// Registers a new danger and notifies nearby users.
    ///
    /// The event gets a fresh id, an expiration and (unless the report gives
    /// one) a radius derived from its type. It is persisted and published
    /// before the notification attempt starts. Never fails: storage and
    /// notification problems are logged.
    pub async fn report(&self, report: DangerReport) -> String {
        if !report.position.is_valid() {
            warn!(
                "Danger reported at out-of-range position ({}, {})",
                report.position.latitude, report.position.longitude
            );
        }

        let event = {
            let mut events = self.lock_events();
            let event = DangerEvent::from_report(fresh_id(&events), report, Utc::now());
            events.push(event.clone());
            self.commit(&events);
            event
        };
        info!(
            "Reported {} danger {} (radius {:.0}m)",
            event.danger_type, event.id, event.radius
        );

        self.notify_nearby_users(&event).await;
        event.id
    }

    /// Records an independent confirmation of a danger.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown.
    pub fn confirm(&self, id: &str) -> bool {
        self.update_event(id, |event| event.report_count += 1)
    }

    /// Marks a danger as no longer present. The record is kept.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown.
    pub fn dismiss(&self, id: &str) -> bool {
        self.update_event(id, |event| event.is_active = false)
    }

    /// Removes every danger and erases the persisted collection.
    pub fn clear_all(&self) {
        let mut events = self.lock_events();
        events.clear();
        if let Err(e) = self.store.remove(&self.config.dangers_key) {
            error!("Failed to erase stored dangers: {e}");
        }
        self.feed.publish(Snapshot::from(Vec::new()));
        drop(events);
        info!("Cleared all dangers");
    }

    /// Removes dangers whose expiration time has passed.
    ///
    /// Returns the number of dangers removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    /// Removes dangers that have expired as of `now`.
    ///
    /// Persists and publishes only if something was removed.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut events = self.lock_events();
        let before = events.len();
        events.retain(|event| !event.is_expired_at(now));
        let removed = before - events.len();

        if removed > 0 {
            self.commit(&events);
            info!("Swept {removed} expired danger(s)");
        }
        removed
    }

    // ==================== Queries ====================

    /// Returns the active dangers and a subscription to later changes.
    #[must_use]
    pub fn active_events(&self) -> ActiveEvents {
        let events = self.lock_events();
        let updates = self.feed.subscribe();
        ActiveEvents::new(active_snapshot(&events), updates)
    }

    /// Subscribes to later snapshots without reading the current one.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.feed.subscribe()
    }

    /// The feed that receives a snapshot after every change.
    #[must_use]
    pub const fn feed(&self) -> &DangerFeed {
        &self.feed
    }

    /// Current active dangers.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        active_snapshot(&self.lock_events())
    }

    /// Every tracked danger, active or dismissed, in registry order.
    #[must_use]
    pub fn all_events(&self) -> Vec<DangerEvent> {
        self.lock_events().clone()
    }

    /// Looks up a danger by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<DangerEvent> {
        self.lock_events().iter().find(|event| event.id == id).cloned()
    }

    /// Active dangers within `radius` meters of `center`, in registry order.
    #[must_use]
    pub fn nearby(&self, center: &Coordinate, radius: f64) -> Vec<DangerEvent> {
        self.lock_events()
            .iter()
            .filter(|event| event.is_active && geo::within_radius(center, &event.position, radius))
            .cloned()
            .collect()
    }

    /// Counts by type and lifecycle state.
    #[must_use]
    pub fn stats(&self) -> DangerStats {
        self.stats_at(Utc::now())
    }

    /// Counts by type and lifecycle state as of `now`.
    #[must_use]
    pub fn stats_at(&self, now: DateTime<Utc>) -> DangerStats {
        DangerStats::compute(self.lock_events().iter(), now)
    }

    // ==================== Background work ====================

    /// Looks up the active dangers around the device.
    ///
    /// Returns how many were found, or `None` if no position was available.
    /// Nothing else is done with the result yet.
    pub async fn check_proximity(&self) -> Option<usize> {
        match self.positions.current_position().await {
            Ok(position) => {
                let count = self.nearby(&position, self.config.proximity_radius).len();
                debug!(
                    "{count} active danger(s) within {:.0}m",
                    self.config.proximity_radius
                );
                Some(count)
            }
            Err(e) => {
                debug!("Proximity check skipped: {e}");
                None
            }
        }
    }

    // ==================== Internals ====================

    fn lock_events(&self) -> MutexGuard<'_, Vec<DangerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_event(&self, id: &str, apply: impl FnOnce(&mut DangerEvent)) -> bool {
        let mut events = self.lock_events();
        let Some(event) = events.iter_mut().find(|event| event.id == id) else {
            debug!("Ignoring update for unknown danger {id}");
            return false;
        };
        apply(event);
        self.commit(&events);
        true
    }

    /// Persists and publishes the collection. Callers hold the lock.
    fn commit(&self, events: &[DangerEvent]) {
        self.persist(events);
        self.feed.publish(active_snapshot(events));
    }

    fn persist(&self, events: &[DangerEvent]) {
        let result = serde_json::to_string(events)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&self.config.dangers_key, &json));
        if let Err(e) = result {
            error!("Failed to save dangers: {e}");
        }
    }

    async fn notify_nearby_users(&self, event: &DangerEvent) {
        let position = match self.positions.current_position().await {
            Ok(position) => position,
            Err(e) => {
                warn!("Skipping notification for danger {}: {e}", event.id);
                return;
            }
        };

        let distance = event.distance_from(&position);
        if distance < self.config.self_notification_radius {
            debug!(
                "Reporter is {distance:.0}m from danger {}, not notifying",
                event.id
            );
            return;
        }

        let candidate = NotificationCandidate::for_event(event, distance, Utc::now());
        self.notifications.send_local_notification(&candidate).await;
    }
}

impl std::fmt::Debug for DangerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DangerRegistry")
            .field("events", &self.lock_events().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn read_events(store: &dyn KeyValueStore, key: &str) -> Vec<DangerEvent> {
    match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            error!("Failed to parse stored dangers: {e}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            error!("Failed to read stored dangers: {e}");
            Vec::new()
        }
    }
}

fn active_snapshot(events: &[DangerEvent]) -> Snapshot {
    events.iter().filter(|event| event.is_active).cloned().collect()
}

/// Generates an id unused by `events`: creation time in milliseconds
/// followed by 8 random bytes, both hex-encoded.
fn fresh_id(events: &[DangerEvent]) -> String {
    let millis = Utc::now().timestamp_millis();
    loop {
        let mut entropy = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut entropy);
        let id = format!("{millis:x}{}", hex::encode(entropy));
        if events.iter().all(|event| event.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::danger::{DangerSeverity, DangerType};
    use crate::storage::MemoryStore;

    #[test]
    fn fresh_id_is_unique_among_events() {
        let mut events = Vec::new();
        for _ in 0..100 {
            let id = fresh_id(&events);
            assert!(events.iter().all(|e: &DangerEvent| e.id != id));
            events.push(DangerEvent::from_report(
                id,
                DangerReport::new(
                    DangerType::Other,
                    DangerSeverity::Low,
                    Coordinate::new(0.0, 0.0),
                ),
                Utc::now(),
            ));
        }
    }

    #[test]
    fn fresh_id_is_hex() {
        let id = fresh_id(&[]);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(id.len() > 16);
    }

    #[test]
    fn active_snapshot_skips_dismissed() {
        let now = Utc::now();
        let report = DangerReport::new(
            DangerType::Hazard,
            DangerSeverity::High,
            Coordinate::new(0.0, 0.0),
        );
        let active = DangerEvent::from_report("a".to_string(), report.clone(), now);
        let mut dismissed = DangerEvent::from_report("b".to_string(), report, now);
        dismissed.is_active = false;

        let snapshot = active_snapshot(&[active, dismissed]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a");
    }

    #[test]
    fn read_events_treats_corrupt_blob_as_empty() {
        let store = MemoryStore::new();
        store.set("dangers", "[{broken").unwrap();
        assert!(read_events(&store, "dangers").is_empty());
    }

    #[test]
    fn read_events_keeps_expired_entries_for_caller() {
        let store = MemoryStore::new();
        let event = DangerEvent::from_report(
            "old".to_string(),
            DangerReport::new(
                DangerType::Police,
                DangerSeverity::Low,
                Coordinate::new(0.0, 0.0),
            ),
            Utc::now() - Duration::hours(2),
        );
        assert!(event.is_expired());
        store
            .set("dangers", &serde_json::to_string(&[event]).unwrap())
            .unwrap();

        assert_eq!(read_events(&store, "dangers").len(), 1);
    }
}
