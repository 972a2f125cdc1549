//! File link reconciliation for record merges.
//!
//! When CRM records are merged, the losing records are deleted and the host
//! severs their file links. This crate keeps those files attached by moving
//! the links onto the surviving master record.
//!
//! # Process
//!
//! 1. **Before delete**: snapshot the links of every record about to be
//!    deleted ([`LinkSnapshotCache`])
//! 2. **After delete**: pick out the deletions that report a master, read the
//!    masters' current links once, and insert the missing ones in a single
//!    batch ([`MergeReconciler`])
//!
//! Both phases share a [`MergeTransaction`], created per event.
//!
//! # Example
//!
//! ```
//! use mergelink_reconcile::{MergeTransaction, ReconcileConfig};
//! use mergelink_store::{LinkStore, MemoryLinkStore};
//! use mergelink_types::{DeletedRecord, DocumentId, NewFileLink, RecordId, RecordKind, ShareType, Visibility};
//! use std::collections::BTreeSet;
//!
//! let store = MemoryLinkStore::new();
//! let (loser, master) = (RecordId::new(), RecordId::new());
//! store
//!     .insert_links(&[NewFileLink::new(loser, DocumentId::new(), ShareType::Viewer, Visibility::AllUsers)])
//!     .unwrap();
//!
//! let mut tx = MergeTransaction::new(&store, ReconcileConfig::default());
//! tx.before_delete(&[DeletedRecord::deleted(loser, RecordKind::Account)]).unwrap();
//! store.sever_links(&BTreeSet::from([loser])).unwrap();
//!
//! let report = tx
//!     .after_delete(&[DeletedRecord::merged_into(loser, RecordKind::Account, master)])
//!     .unwrap();
//! assert_eq!(report.inserted.len(), 1);
//! ```

mod cache;
mod config;
mod error;
mod reconciler;
mod transaction;

pub use cache::LinkSnapshotCache;
pub use config::{DuplicatePolicy, ReconcileConfig};
pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{MergeReconciler, ReconcileReport};
pub use transaction::{
    apply_merge, MergeTransaction, TriggerOperation, TriggerOutcome, TriggerPhase,
};
