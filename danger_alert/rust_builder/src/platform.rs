//! Bridge-side implementations of the core's platform collaborators.
//!
//! Flutter owns the geolocation and notification plugins. It pushes the
//! latest device position into [`DevicePosition`] and drains the
//! [`NotificationOutbox`] to schedule notifications with its own plugin.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use danger_alert_core::geo::{self, Coordinate, LocationError, PositionProvider};
use danger_alert_core::notification::{self, LocalNotification, Notifier};
use log::debug;

/// Last position reported by the Flutter geolocation plugin.
#[derive(Debug, Default)]
pub struct DevicePosition {
    latest: Mutex<Option<Coordinate>>,
    permission_granted: AtomicBool,
}

impl DevicePosition {
    /// Records a new position fix. Implies permission was granted.
    pub fn update(&self, position: Coordinate) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
        self.permission_granted.store(true, Ordering::SeqCst);
    }

    /// Records the outcome of the platform permission prompt.
    ///
    /// Revoking permission forgets the last position.
    pub fn set_permission(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
        if !granted {
            *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }
}

/// Flutter owns the permission dialog. `request_permissions` never prompts:
/// it answers with the outcome last recorded through
/// [`DevicePosition::set_permission`] or implied by a position fix, exactly
/// like `check_permissions`.
#[async_trait]
impl PositionProvider for DevicePosition {
    async fn current_position(&self) -> geo::Result<Coordinate> {
        if !self.permission_granted.load(Ordering::SeqCst) {
            return Err(LocationError::PermissionDenied);
        }
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ok_or_else(|| LocationError::Unavailable("no position fix yet".to_string()))
    }

    async fn request_permissions(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }

    async fn check_permissions(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }
}

/// Notifications waiting for Flutter to schedule them.
#[derive(Debug, Default)]
pub struct NotificationOutbox {
    pending: Mutex<Vec<LocalNotification>>,
}

impl NotificationOutbox {
    /// Removes and returns every pending notification, oldest first.
    pub fn drain(&self) -> Vec<LocalNotification> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl Notifier for NotificationOutbox {
    async fn schedule(&self, notification: LocalNotification) -> notification::Result<()> {
        debug!("Queued notification {} for Flutter", notification.id);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}
