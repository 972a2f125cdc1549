//! Records handed over by the host when a delete trigger fires.

use crate::{Error, RecordId, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Record types whose merges carry file links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Account,
    Contact,
    Lead,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Account => "Account",
            Self::Contact => "Contact",
            Self::Lead => "Lead",
        };
        f.write_str(name)
    }
}

/// A record that is about to be, or has just been, deleted.
///
/// `master_record_id` is only known after the deletion. When present, the
/// deletion was the losing side of a merge into that record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    #[serde(default)]
    pub master_record_id: Option<RecordId>,
}

impl DeletedRecord {
    /// A plain deletion (or a before-delete record, where the master is not
    /// known yet).
    #[must_use]
    pub const fn deleted(id: RecordId, kind: RecordKind) -> Self {
        Self {
            id,
            kind,
            master_record_id: None,
        }
    }

    /// A record that lost a merge into `master`.
    #[must_use]
    pub const fn merged_into(id: RecordId, kind: RecordKind, master: RecordId) -> Self {
        Self {
            id,
            kind,
            master_record_id: Some(master),
        }
    }

    /// Returns true if this deletion was part of a merge.
    #[must_use]
    pub const fn is_merge(&self) -> bool {
        self.master_record_id.is_some()
    }

    /// Translates a host record (`{"Id": ..., "MasterRecordId": ...}`) into a
    /// typed deleted record.
    ///
    /// `Id` is required. A missing, null, blank or unparseable
    /// `MasterRecordId` yields a plain deletion.
    pub fn from_host_json(kind: RecordKind, value: &Value) -> Result<Self> {
        let id = value
            .get("Id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField("Id".to_string()))?;
        let id = RecordId::parse(id)?;

        let master_record_id = match value.get("MasterRecordId").and_then(Value::as_str) {
            Some(raw) if !raw.trim().is_empty() => match RecordId::parse(raw) {
                Ok(master) => Some(master),
                Err(e) => {
                    warn!("Ignoring unparseable MasterRecordId {raw:?} on {kind} {id}: {e}");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            id,
            kind,
            master_record_id,
        })
    }
}
