//! Core type definitions for MergeLink.
//!
//! This crate defines the types shared by the store and the reconciler:
//! - Record, document and link identifiers (UUID v7)
//! - File link rows and their share policy fields
//! - Deleted records as reported by the host's delete triggers
//!
//! Nothing here talks to a store.

mod ids;
mod link;
mod record;

pub use ids::{DocumentId, LinkId, RecordId};
pub use link::{FileLink, NewFileLink, ShareType, Visibility};
pub use record::{DeletedRecord, RecordKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid share type: {0}")]
    InvalidShareType(String),

    #[error("invalid visibility: {0}")]
    InvalidVisibility(String),
}
