//! Pre-deletion snapshot of file links, keyed by the record being deleted.

use crate::error::{ReconcileError, ReconcileResult};
use mergelink_store::LinkStore;
use mergelink_types::{FileLink, RecordId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Links each record held just before it was deleted.
///
/// Owned by one merge transaction; dropping the transaction drops the
/// snapshot.
#[derive(Debug, Default)]
pub struct LinkSnapshotCache {
    snapshots: HashMap<RecordId, Vec<FileLink>>,
}

impl LinkSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every live link of `record_ids` in one bulk query and appends
    /// them to the snapshot. Returns the number of links captured.
    ///
    /// An empty set issues no read.
    pub fn capture<S>(&mut self, store: &S, record_ids: &BTreeSet<RecordId>) -> ReconcileResult<usize>
    where
        S: LinkStore + ?Sized,
    {
        if record_ids.is_empty() {
            return Ok(0);
        }

        let links = store
            .links_for_entities(record_ids)
            .map_err(ReconcileError::Read)?;
        let captured = links.len();
        for link in links {
            self.snapshots.entry(link.linked_entity).or_default().push(link);
        }

        debug!("Captured {captured} links for {} records", record_ids.len());
        Ok(captured)
    }

    /// Links captured for `record_id`, empty if it had none.
    pub fn snapshot(&self, record_id: &RecordId) -> &[FileLink] {
        self.snapshots.get(record_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of records with at least one captured link.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of captured links across all records.
    pub fn total_links(&self) -> usize {
        self.snapshots.values().map(Vec::len).sum()
    }
}
