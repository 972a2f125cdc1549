//! Merge reconciler - replays a merge loser's file links onto its master.
//!
//! Runs after the host has deleted the losers. Only records that report a
//! master are considered; their pre-deletion links come from the
//! [`LinkSnapshotCache`] filled in the before-delete phase.

use crate::cache::LinkSnapshotCache;
use crate::config::{DuplicatePolicy, ReconcileConfig};
use crate::error::{ReconcileError, ReconcileResult};
use mergelink_store::LinkStore;
use mergelink_types::{DeletedRecord, DocumentId, FileLink, NewFileLink, RecordId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Deleted records that carried a master reference.
    pub merged_records: usize,
    /// Distinct masters among them.
    pub masters: usize,
    /// Cached links skipped because the master already had the document.
    pub skipped_existing: usize,
    /// Cached links skipped because a sibling already planned the same
    /// (master, document) pair. Always zero under `DuplicatePolicy::Preserve`.
    pub skipped_sibling: usize,
    /// Links of the merged records severed by [`apply_merge`](crate::apply_merge).
    /// Always zero for a plain `reconcile`, where the host severs them.
    pub severed: usize,
    /// Links created on masters.
    pub inserted: Vec<FileLink>,
}

impl ReconcileReport {
    /// Returns true if the pass created no links.
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty()
    }
}

/// Re-creates merge losers' file links on their masters.
#[derive(Debug, Clone, Default)]
pub struct MergeReconciler {
    config: ReconcileConfig,
}

impl MergeReconciler {
    /// Creates a new reconciler.
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconciles a batch of just-deleted records.
    ///
    /// Reads the masters' current links once, plans a link on the master for
    /// every cached document the master does not already have, and writes
    /// the plan in one batch. Batches without merges do no I/O, and an empty
    /// plan skips the write.
    pub fn reconcile<S>(
        &self,
        store: &S,
        cache: &LinkSnapshotCache,
        deleted: &[DeletedRecord],
    ) -> ReconcileResult<ReconcileReport>
    where
        S: LinkStore + ?Sized,
    {
        let (mut report, planned) = self.prepare(store, cache, deleted)?;
        if planned.is_empty() {
            return Ok(report);
        }

        report.inserted = store
            .insert_links(&planned)
            .map_err(ReconcileError::Write)?;

        info!(
            "Re-linked {} files onto {} masters from {} merged records",
            report.inserted.len(),
            report.masters,
            report.merged_records
        );
        Ok(report)
    }

    /// Everything `reconcile` does short of writing: returns the report so
    /// far and the links to insert.
    pub(crate) fn prepare<S>(
        &self,
        store: &S,
        cache: &LinkSnapshotCache,
        deleted: &[DeletedRecord],
    ) -> ReconcileResult<(ReconcileReport, Vec<NewFileLink>)>
    where
        S: LinkStore + ?Sized,
    {
        let merged: Vec<(&DeletedRecord, RecordId)> = deleted
            .iter()
            .filter_map(|record| record.master_record_id.map(|master| (record, master)))
            .collect();
        if merged.is_empty() {
            debug!("No merged records among {} deletions", deleted.len());
            return Ok((ReconcileReport::default(), Vec::new()));
        }

        let masters: BTreeSet<RecordId> = merged.iter().map(|(_, master)| *master).collect();
        let mut report = ReconcileReport {
            merged_records: merged.len(),
            masters: masters.len(),
            ..ReconcileReport::default()
        };

        let already_linked = self.linked_documents(store, &masters)?;
        let planned = self.plan(cache, &merged, &already_linked, &mut report);
        if planned.is_empty() {
            debug!(
                "Nothing to re-link for {} merged records ({} already on master)",
                report.merged_records, report.skipped_existing
            );
        }
        Ok((report, planned))
    }

    /// Master -> documents it is linked to, as of one bulk read.
    fn linked_documents<S>(
        &self,
        store: &S,
        masters: &BTreeSet<RecordId>,
    ) -> ReconcileResult<HashMap<RecordId, HashSet<DocumentId>>>
    where
        S: LinkStore + ?Sized,
    {
        let existing = store
            .links_for_entities(masters)
            .map_err(ReconcileError::Read)?;

        let mut linked: HashMap<RecordId, HashSet<DocumentId>> = HashMap::new();
        for link in existing {
            linked
                .entry(link.linked_entity)
                .or_default()
                .insert(link.content_document);
        }
        Ok(linked)
    }

    fn plan(
        &self,
        cache: &LinkSnapshotCache,
        merged: &[(&DeletedRecord, RecordId)],
        already_linked: &HashMap<RecordId, HashSet<DocumentId>>,
        report: &mut ReconcileReport,
    ) -> Vec<NewFileLink> {
        let mut planned = Vec::new();
        let mut planned_keys: HashSet<(RecordId, DocumentId)> = HashSet::new();

        for (record, master) in merged {
            let snapshot = cache.snapshot(&record.id);
            debug!(
                "{} {} merged into {}: {} cached links",
                record.kind,
                record.id,
                master,
                snapshot.len()
            );

            let existing = already_linked.get(master);
            for link in snapshot {
                if existing.is_some_and(|docs| docs.contains(&link.content_document)) {
                    report.skipped_existing += 1;
                    continue;
                }

                let new_link = link.retarget(*master);
                if !planned_keys.insert(new_link.key()) {
                    match self.config.duplicate_policy {
                        DuplicatePolicy::Deduplicate => {
                            report.skipped_sibling += 1;
                            continue;
                        }
                        DuplicatePolicy::Preserve => {
                            warn!(
                                "Document {} planned twice for master {}; the store will reject the batch",
                                link.content_document, master
                            );
                        }
                    }
                }
                planned.push(new_link);
            }
        }

        planned
    }
}
