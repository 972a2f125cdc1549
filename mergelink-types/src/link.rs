//! File link rows: the association between a document and a record.
//!
//! A link carries two policy fields, [`ShareType`] and [`Visibility`]. They
//! describe the share itself and travel unchanged when a link is re-created on
//! another record.

use crate::{DocumentId, Error, LinkId, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level a link grants on its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareType {
    /// Read-only access.
    #[serde(rename = "V")]
    Viewer,
    /// Read and edit access.
    #[serde(rename = "C")]
    Collaborator,
    /// Access derived from the record's own sharing settings.
    #[serde(rename = "I")]
    Inferred,
}

impl ShareType {
    /// Returns the single-letter code used by the host platform and the store.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Viewer => "V",
            Self::Collaborator => "C",
            Self::Inferred => "I",
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ShareType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "V" => Ok(Self::Viewer),
            "C" => Ok(Self::Collaborator),
            "I" => Ok(Self::Inferred),
            other => Err(Error::InvalidShareType(other.to_string())),
        }
    }
}

/// Who can see the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    AllUsers,
    InternalUsers,
    SharedUsers,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllUsers => "AllUsers",
            Self::InternalUsers => "InternalUsers",
            Self::SharedUsers => "SharedUsers",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AllUsers" => Ok(Self::AllUsers),
            "InternalUsers" => Ok(Self::InternalUsers),
            "SharedUsers" => Ok(Self::SharedUsers),
            other => Err(Error::InvalidVisibility(other.to_string())),
        }
    }
}

/// A persisted link between a record and a document.
///
/// At most one live row exists per (`linked_entity`, `content_document`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLink {
    pub id: LinkId,
    pub linked_entity: RecordId,
    pub content_document: DocumentId,
    pub share_type: ShareType,
    pub visibility: Visibility,
    pub is_deleted: bool,
}

impl FileLink {
    /// Builds an insert payload that re-creates this link's document share on
    /// `target`, copying the policy fields verbatim.
    #[must_use]
    pub fn retarget(&self, target: RecordId) -> NewFileLink {
        NewFileLink {
            linked_entity: target,
            content_document: self.content_document,
            share_type: self.share_type,
            visibility: self.visibility,
        }
    }
}

/// Insert payload for a file link. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFileLink {
    pub linked_entity: RecordId,
    pub content_document: DocumentId,
    pub share_type: ShareType,
    pub visibility: Visibility,
}

impl NewFileLink {
    pub fn new(
        linked_entity: RecordId,
        content_document: DocumentId,
        share_type: ShareType,
        visibility: Visibility,
    ) -> Self {
        Self {
            linked_entity,
            content_document,
            share_type,
            visibility,
        }
    }

    /// The uniqueness key enforced by every store.
    #[must_use]
    pub const fn key(&self) -> (RecordId, DocumentId) {
        (self.linked_entity, self.content_document)
    }
}
