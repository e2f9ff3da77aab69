//! Error types for foreground danger operations.
//!
//! Registry mutations themselves never fail; these errors come from the
//! collaborators a foreground action depends on.

use thiserror::Error;

use crate::geo::LocationError;
use crate::storage::StorageError;

/// Error type for danger operations.
#[derive(Error, Debug)]
pub enum DangerError {
    /// The reporter's position could not be acquired.
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Local storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for danger operations.
pub type Result<T> = std::result::Result<T, DangerError>;
