//! Persisted notification preferences.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error};
use tokio::sync::broadcast;

use super::types::{NotificationPreferences, PreferencesUpdate};
use crate::storage::KeyValueStore;

const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Owner of the user's [`NotificationPreferences`].
///
/// Preferences change only through [`update`](Self::update), which persists
/// the result immediately and broadcasts it to subscribers.
pub struct PreferencesStore {
    current: Mutex<NotificationPreferences>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    updates: broadcast::Sender<NotificationPreferences>,
}

impl PreferencesStore {
    /// Loads preferences stored under `key`.
    ///
    /// Missing or unreadable preferences fall back to the defaults; the
    /// failure is logged and the stored value is left untouched.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match store.get(&key) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                error!("Failed to parse notification preferences: {e}");
                NotificationPreferences::default()
            }),
            Ok(None) => NotificationPreferences::default(),
            Err(e) => {
                error!("Failed to read notification preferences: {e}");
                NotificationPreferences::default()
            }
        };
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Self {
            current: Mutex::new(current),
            store,
            key,
            updates,
        }
    }

    /// Returns a copy of the current preferences.
    #[must_use]
    pub fn current(&self) -> NotificationPreferences {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merges `update` into the current preferences, persists and broadcasts
    /// the result. Returns the new preferences.
    pub fn update(&self, update: PreferencesUpdate) -> NotificationPreferences {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let updated = current.clone().merged(update);
        *current = updated.clone();
        self.persist(&updated);
        drop(current);

        if self.updates.send(updated.clone()).is_err() {
            debug!("No preference subscribers");
        }
        updated
    }

    /// Subscribes to future preference changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationPreferences> {
        self.updates.subscribe()
    }

    fn persist(&self, preferences: &NotificationPreferences) {
        let result = serde_json::to_string(preferences)
            .map_err(crate::storage::StorageError::from)
            .and_then(|json| self.store.set(&self.key, &json));
        if let Err(e) = result {
            error!("Failed to save notification preferences: {e}");
        }
    }
}

impl std::fmt::Debug for PreferencesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesStore")
            .field("key", &self.key)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danger::DangerSeverity;
    use crate::storage::MemoryStore;

    const KEY: &str = "notificationSettings";

    #[test]
    fn missing_preferences_use_defaults() {
        let prefs = PreferencesStore::load(Arc::new(MemoryStore::new()), KEY);
        assert_eq!(prefs.current(), NotificationPreferences::default());
    }

    #[test]
    fn corrupt_preferences_use_defaults_and_keep_blob() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "{not json").unwrap();

        let prefs = PreferencesStore::load(store.clone(), KEY);

        assert_eq!(prefs.current(), NotificationPreferences::default());
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn update_persists_immediately() {
        let store = Arc::new(MemoryStore::new());
        let prefs = PreferencesStore::load(store.clone(), KEY);

        let updated = prefs.update(PreferencesUpdate {
            min_severity: Some(DangerSeverity::High),
            ..PreferencesUpdate::default()
        });

        assert_eq!(updated.min_severity, DangerSeverity::High);
        let reloaded = PreferencesStore::load(store, KEY);
        assert_eq!(reloaded.current(), updated);
    }

    #[test]
    fn update_notifies_subscribers() {
        let prefs = PreferencesStore::load(Arc::new(MemoryStore::new()), KEY);
        let mut rx = prefs.subscribe();

        prefs.update(PreferencesUpdate {
            enabled: Some(false),
            ..PreferencesUpdate::default()
        });

        let received = rx.try_recv().unwrap();
        assert!(!received.enabled);
    }
}
