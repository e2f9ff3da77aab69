//! Integration tests for the context object and its background tasks.
//!
//! The sweep tests run on the real clock because expiry is judged against
//! wall-clock time. The proximity tests run on a paused tokio clock.

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use danger_alert_core::danger::{DangerEvent, DangerSeverity, DangerType};
use danger_alert_core::storage::{KeyValueStore, MemoryStore};
use danger_alert_core::{CoreConfig, DangerAlertCore};
use helpers::{report_at, MockPositionProvider, RecordingNotifier, PARIS};

fn fast_config() -> CoreConfig {
    CoreConfig {
        sweep_interval_secs: 1,
        proximity_check_interval_secs: 1,
        ..CoreConfig::default()
    }
}

/// A store holding one police event that expires after `millis`.
fn store_with_event_expiring_in(millis: i64) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut event = DangerEvent::from_report(
        "soon".to_string(),
        report_at(DangerType::Police, PARIS),
        Utc::now(),
    );
    event.expires_at = Some(Utc::now() + Duration::milliseconds(millis));
    store
        .set("dangers", &serde_json::to_string(&[event]).unwrap())
        .unwrap();
    store
}

#[tokio::test]
async fn sweep_task_removes_event_once_expired() {
    let store = store_with_event_expiring_in(500);

    let mut core = DangerAlertCore::new(
        store.clone(),
        Arc::new(MockPositionProvider::at(PARIS)),
        Arc::new(RecordingNotifier::default()),
        fast_config(),
    );
    let mut view = core.registry().active_events();
    assert_eq!(view.current().len(), 1);

    core.start_background_tasks();

    let snapshot = tokio::time::timeout(StdDuration::from_secs(5), view.changed())
        .await
        .expect("sweep should publish within the timeout")
        .expect("feed should stay open");
    assert!(snapshot.is_empty());
    assert_eq!(store.get("dangers").unwrap().as_deref(), Some("[]"));

    core.shutdown();
}

#[tokio::test]
async fn zero_interval_config_still_sweeps() {
    let store = store_with_event_expiring_in(200);
    let config = CoreConfig::from_json(
        r#"{"sweep_interval_secs": 0, "proximity_check_interval_secs": 0}"#,
    )
    .unwrap();

    let mut core = DangerAlertCore::new(
        store.clone(),
        Arc::new(MockPositionProvider::at(PARIS)),
        Arc::new(RecordingNotifier::default()),
        config,
    );
    let mut view = core.registry().active_events();

    core.start_background_tasks();

    let snapshot = tokio::time::timeout(StdDuration::from_secs(5), view.changed())
        .await
        .expect("sweep should keep running with a zero interval")
        .expect("feed should stay open");
    assert!(snapshot.is_empty());
    assert!(core.registry().all_events().is_empty());
    assert!(core.is_running());

    core.shutdown();
}

#[tokio::test(start_paused = true)]
async fn proximity_task_polls_position() {
    let positions = Arc::new(MockPositionProvider::at(PARIS));
    let mut core = DangerAlertCore::new(
        Arc::new(MemoryStore::new()),
        positions.clone(),
        Arc::new(RecordingNotifier::default()),
        fast_config(),
    );

    core.start_background_tasks();
    tokio::time::sleep(StdDuration::from_millis(2_500)).await;
    core.shutdown();

    // Ticks at 1s and 2s; the immediate first tick is skipped.
    let calls = positions.calls();
    assert_eq!(calls, 2, "expected one proximity check per elapsed second");

    tokio::time::sleep(StdDuration::from_millis(1_500)).await;
    assert_eq!(positions.calls(), calls, "no checks after shutdown");
}

#[tokio::test(start_paused = true)]
async fn proximity_failures_do_not_stop_the_task() {
    let positions = Arc::new(MockPositionProvider::denied());
    let mut core = DangerAlertCore::new(
        Arc::new(MemoryStore::new()),
        positions.clone(),
        Arc::new(RecordingNotifier::default()),
        fast_config(),
    );

    core.start_background_tasks();
    tokio::time::sleep(StdDuration::from_millis(2_500)).await;

    assert!(positions.calls() >= 2);
    assert!(core.is_running());
}

#[tokio::test]
async fn core_opens_sqlite_database_in_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("danger_alert.db");

    let id = {
        let core = DangerAlertCore::open(
            &path,
            Arc::new(MockPositionProvider::at(PARIS)),
            Arc::new(RecordingNotifier::default()),
            CoreConfig::default(),
        )
        .unwrap();
        core.submit_report(DangerType::Hazard, DangerSeverity::High, None, None)
            .await
            .unwrap()
    };

    let reopened = DangerAlertCore::open(
        &path,
        Arc::new(MockPositionProvider::at(PARIS)),
        Arc::new(RecordingNotifier::default()),
        CoreConfig::default(),
    )
    .unwrap();
    assert!(reopened.registry().get(&id).is_some());
}
