//! Error types for the link store layer.

use mergelink_types::{DocumentId, RecordId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A batch insert would create a second live link for the same pair.
    /// The whole batch is rejected.
    #[error("duplicate link: record {linked_entity} already linked to document {content_document}")]
    UniqueViolation {
        linked_entity: RecordId,
        content_document: DocumentId,
    },

    /// The store cannot serve requests (e.g. a poisoned connection lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<mergelink_types::Error> for StoreError {
    fn from(e: mergelink_types::Error) -> Self {
        Self::InvalidData(e.to_string())
    }
}

impl From<uuid::Error> for StoreError {
    fn from(e: uuid::Error) -> Self {
        Self::InvalidData(e.to_string())
    }
}
