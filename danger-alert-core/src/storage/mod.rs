//! Local key-value storage.
//!
//! The core persists two JSON blobs: the danger collection and the
//! notification preferences. Both go through the [`KeyValueStore`] trait so
//! the host can choose where they live.
//!
//! - [`SqliteStore`]: a single `kv_store` table in a local `SQLite` database
//! - [`MemoryStore`]: a process-local map, for tests and previews

mod error;
mod memory;
mod sqlite;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Flat string key-value storage.
///
/// Values are opaque strings (JSON in practice). Implementations must be safe
/// to share between the registry, the preferences store and background tasks.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}
