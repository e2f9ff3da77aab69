//! High-level notification API.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use super::gate::should_notify;
use super::notifier::Notifier;
use super::preferences::PreferencesStore;
use super::types::{LocalNotification, NotificationCandidate};

/// Applies the user's preferences to candidates and dispatches the survivors.
///
/// # Example
///
/// ```ignore
/// let service = NotificationService::new(preferences, notifier);
/// let sent = service.send_local_notification(&candidate).await;
/// ```
pub struct NotificationService {
    preferences: PreferencesStore,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    /// Creates a service over loaded preferences and a platform notifier.
    #[must_use]
    pub fn new(preferences: PreferencesStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            preferences,
            notifier,
        }
    }

    /// The user's notification preferences.
    #[must_use]
    pub const fn preferences(&self) -> &PreferencesStore {
        &self.preferences
    }

    /// Sends a local notification for `candidate` if the preferences allow it.
    ///
    /// Returns whether the notification was handed to the platform. Dispatch
    /// failures are logged and reported as `false`.
    pub async fn send_local_notification(&self, candidate: &NotificationCandidate) -> bool {
        let preferences = self.preferences.current();

        if !should_notify(
            &preferences,
            candidate.danger_type,
            candidate.severity,
            candidate.distance,
        ) {
            debug!(
                "Notification for {} suppressed by preferences ({} {:?} at {:.0}m)",
                candidate.id, candidate.danger_type, candidate.severity, candidate.distance
            );
            return false;
        }

        let notification = LocalNotification::from_candidate(candidate, &preferences, Utc::now());
        match self.notifier.schedule(notification).await {
            Ok(()) => {
                info!("Notification scheduled for danger {}", candidate.id);
                true
            }
            Err(e) => {
                warn!("Failed to send notification for {}: {e}", candidate.id);
                false
            }
        }
    }

    /// Sends a fixed test notification through the normal delivery path.
    pub async fn send_test_notification(&self) -> bool {
        self.send_local_notification(&NotificationCandidate::test(Utc::now()))
            .await
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::danger::{DangerSeverity, DangerType};
    use crate::notification::{NotificationError, PreferencesUpdate, Result};
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<LocalNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn schedule(&self, notification: LocalNotification) -> Result<()> {
            if self.fail {
                return Err(NotificationError::Dispatch("plugin missing".to_string()));
            }
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    fn service(notifier: Arc<RecordingNotifier>) -> NotificationService {
        let preferences = PreferencesStore::load(Arc::new(MemoryStore::new()), "prefs");
        NotificationService::new(preferences, notifier)
    }

    #[tokio::test]
    async fn dispatches_allowed_candidate() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service(notifier.clone());

        assert!(service.send_test_notification().await);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Test notification");
    }

    #[tokio::test]
    async fn suppressed_candidate_never_reaches_notifier() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service(notifier.clone());
        service.preferences().update(PreferencesUpdate {
            danger_types: Some(BTreeSet::from([DangerType::Accident])),
            min_severity: Some(DangerSeverity::High),
            ..PreferencesUpdate::default()
        });

        assert!(!service.send_test_notification().await);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_is_reported_not_raised() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        });
        let service = service(notifier);

        assert!(!service.send_test_notification().await);
    }
}
