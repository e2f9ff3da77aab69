//! Error types for key-value storage.

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage location could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage lock could not be acquired.
    #[error("Storage lock poisoned: {0}")]
    Lock(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_error_display() {
        let err = StorageError::Lock("poisoned".to_string());
        assert_eq!(err.to_string(), "Storage lock poisoned: poisoned");
    }

    #[test]
    fn serialization_error_from_serde() {
        let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err = StorageError::from(json_err);
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn io_error_display() {
        let err = StorageError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        ));
        assert_eq!(err.to_string(), "I/O error: read-only filesystem");
    }

    #[test]
    fn database_error_from_rusqlite() {
        let err = StorageError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().starts_with("Database error:"));
    }
}
