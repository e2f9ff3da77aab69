//! Live view of active dangers.
//!
//! Every change to the registry publishes the full list of active dangers.
//! Subscribers only see snapshots published after they subscribed.

use std::sync::Arc;

use log::debug;
use tokio::sync::broadcast::{self, error::RecvError};

use super::types::DangerEvent;

/// An immutable list of active dangers, in registry order.
pub type Snapshot = Arc<[DangerEvent]>;

const FEED_CAPACITY: usize = 64;

/// Publish/subscribe channel for danger snapshots.
#[derive(Debug, Clone)]
pub struct DangerFeed {
    sender: broadcast::Sender<Snapshot>,
}

impl Default for DangerFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DangerFeed {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Delivers `snapshot` to every current subscriber.
    pub fn publish(&self, snapshot: Snapshot) {
        if let Ok(count) = self.sender.send(snapshot) {
            debug!("Published danger snapshot to {count} subscriber(s)");
        }
    }

    /// Subscribes to snapshots published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// The current active dangers plus a stream of later snapshots.
///
/// # Example
///
/// ```ignore
/// let mut view = registry.active_events();
/// render(view.current());
/// while let Some(snapshot) = view.changed().await {
///     render(&snapshot);
/// }
/// ```
#[derive(Debug)]
pub struct ActiveEvents {
    current: Snapshot,
    updates: broadcast::Receiver<Snapshot>,
}

impl ActiveEvents {
    pub(crate) const fn new(current: Snapshot, updates: broadcast::Receiver<Snapshot>) -> Self {
        Self { current, updates }
    }

    /// The most recently observed snapshot.
    #[must_use]
    pub fn current(&self) -> &[DangerEvent] {
        &self.current
    }

    /// Waits for the next snapshot.
    ///
    /// A subscriber that fell behind skips to the oldest retained snapshot.
    /// Returns `None` once the registry is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        loop {
            match self.updates.recv().await {
                Ok(snapshot) => {
                    self.current = Arc::clone(&snapshot);
                    return Some(snapshot);
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Danger view lagged, skipped {skipped} snapshot(s)");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next snapshot if one is already queued.
    pub fn try_changed(&mut self) -> Option<Snapshot> {
        loop {
            match self.updates.try_recv() {
                Ok(snapshot) => {
                    self.current = Arc::clone(&snapshot);
                    return Some(snapshot);
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}
