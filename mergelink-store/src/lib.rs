//! Backing stores for file links.
//!
//! The reconciler only needs two bulk primitives from its store: read every
//! live link attached to a set of records, and insert a batch of links
//! atomically. [`LinkStore`] captures those, plus `sever_links`, which models
//! the host dropping a deleted record's links, and `merge_links`, which does
//! both halves of a merge in one atomic step.
//!
//! # Backends
//!
//! - [`MemoryLinkStore`]: rows in a `Vec` behind a mutex, for tests and
//!   embedding
//! - [`SqliteLinkStore`]: SQLite via rusqlite, with the (record, document)
//!   uniqueness enforced by a partial unique index over live rows

mod error;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryLinkStore;
pub use sqlite::SqliteLinkStore;

use mergelink_types::{FileLink, NewFileLink, RecordId};
use std::collections::BTreeSet;

/// Bulk access to file link rows.
pub trait LinkStore: Send + Sync {
    /// Returns every live link whose linked entity is in `entities`, in
    /// insertion order.
    fn links_for_entities(&self, entities: &BTreeSet<RecordId>) -> StoreResult<Vec<FileLink>>;

    /// Inserts `links` as one atomic batch and returns the stored rows.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if any link duplicates a
    /// live row or another link in the batch; nothing is written then.
    fn insert_links(&self, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>>;

    /// Marks every live link of `entities` as deleted and returns how many
    /// rows changed.
    fn sever_links(&self, entities: &BTreeSet<RecordId>) -> StoreResult<usize>;

    /// Severs the links of `sever` and inserts `insert` as one atomic unit.
    /// Returns the number of severed rows and the inserted rows.
    ///
    /// On any failure neither change is applied.
    fn merge_links(
        &self,
        sever: &BTreeSet<RecordId>,
        insert: &[NewFileLink],
    ) -> StoreResult<(usize, Vec<FileLink>)>;
}

impl<S: LinkStore + ?Sized> LinkStore for std::sync::Arc<S> {
    fn links_for_entities(&self, entities: &BTreeSet<RecordId>) -> StoreResult<Vec<FileLink>> {
        (**self).links_for_entities(entities)
    }

    fn insert_links(&self, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>> {
        (**self).insert_links(links)
    }

    fn sever_links(&self, entities: &BTreeSet<RecordId>) -> StoreResult<usize> {
        (**self).sever_links(entities)
    }

    fn merge_links(
        &self,
        sever: &BTreeSet<RecordId>,
        insert: &[NewFileLink],
    ) -> StoreResult<(usize, Vec<FileLink>)> {
        (**self).merge_links(sever, insert)
    }
}
