//! Error types for the reconciliation layer.

use mergelink_store::StoreError;
use thiserror::Error;

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur while capturing or reconciling links.
///
/// Every variant is fatal for the enclosing merge transaction. Nothing is
/// retried.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A bulk read from the link store failed.
    #[error("upstream read failed: {0}")]
    Read(#[source] StoreError),

    /// The bulk write (or the severing step of a standalone merge) failed.
    /// No links were created.
    #[error("upstream write failed: {0}")]
    Write(#[source] StoreError),

    /// The reconciler configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReconcileError {
    /// Returns true if the store rejected the write because a link for the
    /// same (record, document) pair already existed.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Write(StoreError::UniqueViolation { .. }))
    }
}
