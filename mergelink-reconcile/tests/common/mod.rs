#![allow(dead_code)]

use mergelink_store::{LinkStore, MemoryLinkStore, StoreError, StoreResult};
use mergelink_types::{DocumentId, FileLink, NewFileLink, RecordId, ShareType, Visibility};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Memory store that counts calls and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryLinkStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seeds links without touching the counters.
    pub fn seed(&self, links: &[NewFileLink]) {
        self.inner.insert_links(links).unwrap();
    }

    /// Severs the links of `entities`, as the host's delete does.
    pub fn sever(&self, entities: &[RecordId]) {
        let entities: BTreeSet<RecordId> = entities.iter().copied().collect();
        self.inner.sever_links(&entities).unwrap();
    }

    /// Live documents linked to `entity`, without touching the counters.
    pub fn documents_of(&self, entity: RecordId) -> Vec<FileLink> {
        self.inner.links_for_entities(&BTreeSet::from([entity])).unwrap()
    }
}

impl LinkStore for CountingStore {
    fn links_for_entities(&self, entities: &BTreeSet<RecordId>) -> StoreResult<Vec<FileLink>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".to_string()));
        }
        self.inner.links_for_entities(entities)
    }

    fn insert_links(&self, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }
        self.inner.insert_links(links)
    }

    fn sever_links(&self, entities: &BTreeSet<RecordId>) -> StoreResult<usize> {
        self.inner.sever_links(entities)
    }

    fn merge_links(
        &self,
        sever: &BTreeSet<RecordId>,
        insert: &[NewFileLink],
    ) -> StoreResult<(usize, Vec<FileLink>)> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }
        self.inner.merge_links(sever, insert)
    }
}

pub fn link(
    entity: RecordId,
    doc: DocumentId,
    share_type: ShareType,
    visibility: Visibility,
) -> NewFileLink {
    NewFileLink::new(entity, doc, share_type, visibility)
}

pub fn viewer_link(entity: RecordId, doc: DocumentId) -> NewFileLink {
    link(entity, doc, ShareType::Viewer, Visibility::AllUsers)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
