//! Per-merge transaction: the state shared by the before-delete and
//! after-delete phases.
//!
//! A `MergeTransaction` is created for one delete/merge event, receives both
//! trigger phases, and is dropped afterwards. Its snapshot cache never
//! outlives it, so nothing captured for one event is visible to another.

use crate::cache::LinkSnapshotCache;
use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::reconciler::{MergeReconciler, ReconcileReport};
use mergelink_store::LinkStore;
use mergelink_types::{DeletedRecord, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// When the trigger fired relative to the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerPhase {
    Before,
    After,
}

/// The operation the trigger fired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOperation {
    Insert,
    Update,
    Delete,
    Undelete,
}

/// What [`MergeTransaction::dispatch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Before delete: number of links captured.
    Captured(usize),
    /// After delete: the reconciliation report.
    Reconciled(ReconcileReport),
    /// Not a delete; nothing to do.
    Ignored,
}

/// State for one merge event, threaded through both trigger phases.
pub struct MergeTransaction<'a, S: LinkStore + ?Sized> {
    store: &'a S,
    cache: LinkSnapshotCache,
    reconciler: MergeReconciler,
}

impl<'a, S: LinkStore + ?Sized> MergeTransaction<'a, S> {
    /// Starts a transaction against `store` with an empty snapshot.
    pub fn new(store: &'a S, config: ReconcileConfig) -> Self {
        Self {
            store,
            cache: LinkSnapshotCache::new(),
            reconciler: MergeReconciler::new(config),
        }
    }

    /// Before-delete phase: snapshots the links of the records about to be
    /// deleted. Returns the number of links captured.
    pub fn before_delete(&mut self, records: &[DeletedRecord]) -> ReconcileResult<usize> {
        let ids: BTreeSet<RecordId> = records.iter().map(|r| r.id).collect();
        self.cache.capture(self.store, &ids)
    }

    /// After-delete phase: re-links merged records' files onto their masters.
    pub fn after_delete(&self, records: &[DeletedRecord]) -> ReconcileResult<ReconcileReport> {
        self.reconciler.reconcile(self.store, &self.cache, records)
    }

    /// Routes a trigger invocation to the matching phase. Only deletes do
    /// any work.
    pub fn dispatch(
        &mut self,
        phase: TriggerPhase,
        operation: TriggerOperation,
        records: &[DeletedRecord],
    ) -> ReconcileResult<TriggerOutcome> {
        match (phase, operation) {
            (TriggerPhase::Before, TriggerOperation::Delete) => {
                self.before_delete(records).map(TriggerOutcome::Captured)
            }
            (TriggerPhase::After, TriggerOperation::Delete) => {
                self.after_delete(records).map(TriggerOutcome::Reconciled)
            }
            _ => {
                debug!("Ignoring {phase:?} {operation:?} trigger for {} records", records.len());
                Ok(TriggerOutcome::Ignored)
            }
        }
    }

    /// The links captured so far.
    pub fn cache(&self) -> &LinkSnapshotCache {
        &self.cache
    }
}

/// Runs a whole merge against `store` as one operation: captures the losers'
/// links, plans their re-links onto the masters, then severs the losers and
/// inserts the plan in a single atomic store call.
///
/// `losers` must carry their master references. If anything fails, the
/// losers keep their links and the masters gain none.
pub fn apply_merge<S>(
    store: &S,
    config: ReconcileConfig,
    losers: &[DeletedRecord],
) -> ReconcileResult<ReconcileReport>
where
    S: LinkStore + ?Sized,
{
    let mut tx = MergeTransaction::new(store, config);
    tx.before_delete(losers)?;

    // Masters are read before the losers are severed. A loser is never its
    // own master, so severing cannot change what the oracle sees.
    let (mut report, planned) = tx.reconciler.prepare(store, &tx.cache, losers)?;

    let ids: BTreeSet<RecordId> = losers.iter().map(|r| r.id).collect();
    if ids.is_empty() && planned.is_empty() {
        return Ok(report);
    }

    let (severed, inserted) = store
        .merge_links(&ids, &planned)
        .map_err(ReconcileError::Write)?;
    report.severed = severed;
    report.inserted = inserted;

    info!(
        "Merged {} records into {} masters: severed {}, re-linked {}",
        report.merged_records,
        report.masters,
        report.severed,
        report.inserted.len()
    );
    Ok(report)
}
