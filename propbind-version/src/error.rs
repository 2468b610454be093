//! Error types for versioned snapshots and their stores.

use propbind_types::ComponentId;
use thiserror::Error;

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, VersionError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Invalid transitions of a [`VersionedEntitySnapshot`](crate::VersionedEntitySnapshot).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The key is neither the active version nor an archived one.
    #[error("unknown version: {0}")]
    UnknownVersion(String),

    /// Writes go to the active version only, unless syncing.
    #[error("cannot write to version {loaded}: the active version is {active}")]
    NotActiveVersion { loaded: String, active: String },

    #[error("cannot delete the active version {0}")]
    CannotDeleteActive(String),

    /// A persisted record that does not describe a valid snapshot.
    #[error("invalid snapshot record: {0}")]
    InvalidRecord(String),
}

/// Errors from a [`ComponentDefinitionStore`](crate::ComponentDefinitionStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("component definition not found: {0}")]
    NotFound(ComponentId),

    /// The id cannot be used as a storage key.
    #[error("invalid component id: {0}")]
    InvalidId(ComponentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}
