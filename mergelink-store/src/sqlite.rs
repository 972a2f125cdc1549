//! SQLite-backed link store.
//!
//! Live rows are unique per (linked_entity, content_document) through a
//! partial unique index, so severed rows never block re-linking the same
//! document.

use crate::{LinkStore, StoreError, StoreResult};
use mergelink_types::{DocumentId, FileLink, LinkId, NewFileLink, RecordId};
use rusqlite::{ffi, params, params_from_iter, Connection, ErrorCode};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Persistent link store backed by SQLite.
pub struct SqliteLinkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLinkStore {
    /// Opens (or creates) a link store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::open_with_conn(Arc::new(Mutex::new(conn)))
    }

    /// Opens an in-memory link store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::open_with_conn(Arc::new(Mutex::new(conn)))
    }

    /// Uses an existing shared connection, creating the schema if needed.
    pub fn open_with_conn(conn: Arc<Mutex<Connection>>) -> StoreResult<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS file_links (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                linked_entity TEXT NOT NULL,
                content_document TEXT NOT NULL,
                share_type TEXT NOT NULL,
                visibility TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            );

            CREATE UNIQUE INDEX IF NOT EXISTS file_links_live_pair
                ON file_links (linked_entity, content_document)
                WHERE is_deleted = 0;

            CREATE INDEX IF NOT EXISTS file_links_entity
                ON file_links (linked_entity);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {e}")))
    }

    /// Returns every row, deleted ones included, in insertion order.
    pub fn all_links(&self) -> StoreResult<Vec<FileLink>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, linked_entity, content_document, share_type, visibility, is_deleted
             FROM file_links ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_row).collect()
    }
}

type RawRow = (String, String, String, String, String, bool);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_row(
    (id, linked_entity, content_document, share_type, visibility, is_deleted): RawRow,
) -> StoreResult<FileLink> {
    Ok(FileLink {
        id: LinkId::parse(&id)?,
        linked_entity: RecordId::parse(&linked_entity)?,
        content_document: DocumentId::parse(&content_document)?,
        share_type: share_type.parse()?,
        visibility: visibility.parse()?,
        is_deleted,
    })
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// True only for the live (record, document) pair index; other constraint
/// failures stay plain database errors.
fn is_pair_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg
                    .as_deref()
                    .is_some_and(|m| m.contains("file_links.linked_entity"))
        }
        _ => false,
    }
}

/// Inserts `links` on an open transaction. The caller commits.
fn insert_rows(conn: &Connection, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>> {
    let mut stmt = conn.prepare(
        "INSERT INTO file_links
         (id, linked_entity, content_document, share_type, visibility, is_deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
    )?;
    let mut inserted = Vec::with_capacity(links.len());
    for link in links {
        let id = LinkId::new();
        let result = stmt.execute(params![
            id.to_string(),
            link.linked_entity.to_string(),
            link.content_document.to_string(),
            link.share_type.code(),
            link.visibility.as_str(),
        ]);
        match result {
            Ok(_) => {}
            Err(e) if is_pair_violation(&e) => {
                return Err(StoreError::UniqueViolation {
                    linked_entity: link.linked_entity,
                    content_document: link.content_document,
                });
            }
            Err(e) => return Err(e.into()),
        }
        inserted.push(FileLink {
            id,
            linked_entity: link.linked_entity,
            content_document: link.content_document,
            share_type: link.share_type,
            visibility: link.visibility,
            is_deleted: false,
        });
    }
    Ok(inserted)
}

fn sever_rows(conn: &Connection, entities: &BTreeSet<RecordId>) -> StoreResult<usize> {
    if entities.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE file_links SET is_deleted = 1
         WHERE is_deleted = 0 AND linked_entity IN ({})",
        placeholders(entities.len())
    );
    Ok(conn.execute(&sql, params_from_iter(entities.iter().map(ToString::to_string)))?)
}

impl LinkStore for SqliteLinkStore {
    fn links_for_entities(&self, entities: &BTreeSet<RecordId>) -> StoreResult<Vec<FileLink>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let sql = format!(
            "SELECT id, linked_entity, content_document, share_type, visibility, is_deleted
             FROM file_links
             WHERE is_deleted = 0 AND linked_entity IN ({})
             ORDER BY seq",
            placeholders(entities.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(entities.iter().map(ToString::to_string)), read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let links = rows
            .into_iter()
            .map(decode_row)
            .collect::<StoreResult<Vec<_>>>()?;
        debug!("Read {} links for {} records", links.len(), entities.len());
        Ok(links)
    }

    fn insert_links(&self, links: &[NewFileLink]) -> StoreResult<Vec<FileLink>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        // An early return drops `tx`, rolling back the rows already written.
        let inserted = insert_rows(&tx, links)?;
        tx.commit()?;
        debug!("Inserted {} links", inserted.len());
        Ok(inserted)
    }

    fn sever_links(&self, entities: &BTreeSet<RecordId>) -> StoreResult<usize> {
        let conn = self.conn()?;
        let severed = sever_rows(&conn, entities)?;
        debug!("Severed {severed} links from {} records", entities.len());
        Ok(severed)
    }

    fn merge_links(
        &self,
        sever: &BTreeSet<RecordId>,
        insert: &[NewFileLink],
    ) -> StoreResult<(usize, Vec<FileLink>)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let severed = sever_rows(&tx, sever)?;
        let inserted = insert_rows(&tx, insert)?;
        tx.commit()?;
        debug!("Severed {severed} links and inserted {} in one transaction", inserted.len());
        Ok((severed, inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_insert(conn: &Connection, id: &str, entity: &str, doc: &str) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO file_links (id, linked_entity, content_document, share_type, visibility)
             VALUES (?1, ?2, ?3, 'V', 'AllUsers')",
            params![id, entity, doc],
        )
    }

    #[test]
    fn only_the_pair_index_counts_as_a_pair_violation() {
        let store = SqliteLinkStore::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let (entity, doc) = (RecordId::new().to_string(), DocumentId::new().to_string());
        raw_insert(&conn, "row-1", &entity, &doc).unwrap();

        let same_pair = raw_insert(&conn, "row-2", &entity, &doc).unwrap_err();
        assert!(is_pair_violation(&same_pair));

        let other_doc = DocumentId::new().to_string();
        let same_id = raw_insert(&conn, "row-1", &entity, &other_doc).unwrap_err();
        assert!(!is_pair_violation(&same_id));

        let not_null = conn
            .execute(
                "INSERT INTO file_links (id, linked_entity, content_document, share_type, visibility)
                 VALUES ('row-3', ?1, NULL, 'V', 'AllUsers')",
                params![entity],
            )
            .unwrap_err();
        assert!(!is_pair_violation(&not_null));
    }
}
