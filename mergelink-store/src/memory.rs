//! In-memory link store.

use crate::{LinkStore, StoreError, StoreResult};
use mergelink_types::{DocumentId, FileLink, LinkId, NewFileLink, RecordId};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Link rows held in memory. Deleted rows are kept with `is_deleted` set.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    rows: Mutex<Vec<FileLink>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every row, deleted ones included.
    pub fn all_links(&self) -> StoreResult<Vec<FileLink>> {
        Ok(self.rows()?.clone())
    }

    fn rows(&self) -> StoreResult<MutexGuard<'_, Vec<FileLink>>> {
        self.rows
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("link rows lock poisoned: {e}")))
    }
}

/// Rejects the batch if any link would duplicate a live row that is not
/// about to be severed, or another link in the batch.
fn check_unique(
    rows: &[FileLink],
    links: &[NewFileLink],
    severing: &BTreeSet<RecordId>,
) -> StoreResult<()> {
    let mut taken: HashSet<(RecordId, DocumentId)> = rows
        .iter()
        .filter(|link| !link.is_deleted && !severing.contains(&link.linked_entity))
        .map(|link| (link.linked_entity, link.content_document))
        .collect();
    for link in links {
        if !taken.insert(link.key()) {
            return Err(StoreError::UniqueViolation {
                linked_entity: link.linked_entity,
                content_document: link.content_document,
            });
        }
    }
    Ok(())
}

fn sever_rows(rows: &mut [FileLink], entities: &BTreeSet<RecordId>) -> usize {
    let mut severed = 0;
    for link in rows.iter_mut() {
        if !link.is_deleted && entities.contains(&link.linked_entity) {
            link.is_deleted = true;
            severed += 1;
        }
    }
    severed
}

fn append_rows(rows: &mut Vec<FileLink>, links: &[NewFileLink]) -> Vec<FileLink> {
    let inserted: Vec<FileLink> = links
        .iter()
        .map(|link| FileLink {
            id: LinkId::new(),
            linked_entity: link.linked_entity,
            content_document: link.content_document,
            share_type: link.share_type,
            visibility: link.visibility,
            is_deleted: false,
        })
        .collect();
    rows.extend(inserted.iter().cloned());
    inserted
}

impl LinkStore for MemoryLinkStore {
    fn links_for_entities(&self, entities: &BTreeSet<RecordId>) -> StoreResult<Vec<FileLink>> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .filter(|link| !link.is_deleted && entities.contains(&link.linked_entity))
            .cloned()
            .collect())
    }

    fn insert_links(&self, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>> {
        let mut rows = self.rows()?;
        check_unique(&rows, links, &BTreeSet::new())?;
        let inserted = append_rows(&mut rows, links);
        debug!("Inserted {} links", inserted.len());
        Ok(inserted)
    }

    fn sever_links(&self, entities: &BTreeSet<RecordId>) -> StoreResult<usize> {
        let mut rows = self.rows()?;
        let severed = sever_rows(&mut rows, entities);
        debug!("Severed {severed} links from {} records", entities.len());
        Ok(severed)
    }

    fn merge_links(
        &self,
        sever: &BTreeSet<RecordId>,
        insert: &[NewFileLink],
    ) -> StoreResult<(usize, Vec<FileLink>)> {
        let mut rows = self.rows()?;
        check_unique(&rows, insert, sever)?;
        let severed = sever_rows(&mut rows, sever);
        let inserted = append_rows(&mut rows, insert);
        debug!("Severed {severed} links and inserted {} under one lock", inserted.len());
        Ok((severed, inserted))
    }
}
