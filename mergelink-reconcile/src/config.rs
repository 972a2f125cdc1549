//! Reconciler configuration.

use crate::error::{ReconcileError, ReconcileResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to treat two merged records that would both re-link the same document
/// to the same master within one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Plan both links and let the store's uniqueness constraint reject the
    /// batch.
    #[default]
    Preserve,
    /// Plan the first link only.
    Deduplicate,
}

/// Configuration for [`MergeReconciler`](crate::MergeReconciler).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Handling of sibling duplicates within one pass.
    pub duplicate_policy: DuplicatePolicy,
}

impl ReconcileConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ReconcileResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ReconcileError::Config(format!("invalid reconcile config: {e}")))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReconcileError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }
}
