//! Danger reporting and tracking.
//!
//! This module owns the set of reported dangers: creation from user reports,
//! confirmation, dismissal, expiration, proximity queries and persistence.
//!
//! # Architecture
//!
//! ```text
//! DangerRegistry (high-level API)
//!     ├── KeyValueStore (persisted JSON collection)
//!     ├── DangerFeed (live snapshots of active dangers)
//!     ├── PositionProvider (reporter position)
//!     └── NotificationService (nearby alerts)
//! ```
//!
//! # Lifecycle
//!
//! A danger is created active with a report count of 1. Confirmations bump
//! the count, a dismissal clears the active flag, and the periodic sweep
//! removes the record once its expiration time has passed.
//!
//! # Types
//!
//! - [`DangerType`]: category of a danger
//! - [`DangerSeverity`]: ordered severity scale
//! - [`DangerReport`]: a user's report before registration
//! - [`DangerEvent`]: a registered danger
//! - [`DangerStats`]: counts by type and lifecycle state

mod error;
mod feed;
mod registry;
pub mod types;

pub use error::{DangerError, Result};
pub use feed::{ActiveEvents, DangerFeed, Snapshot};
pub use registry::DangerRegistry;
pub use types::{
    DangerEvent, DangerReport, DangerSeverity, DangerStats, DangerType, StatusCounts,
};
