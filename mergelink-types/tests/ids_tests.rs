use mergelink_types::{DocumentId, LinkId, RecordId};
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

// ── RecordId ──────────────────────────────────────────────────────

#[test]
fn record_id_new_is_unique() {
    let a = RecordId::new();
    let b = RecordId::new();
    assert_ne!(a, b);
}

#[test]
fn record_id_from_uuid() {
    let uuid = uuid::Uuid::now_v7();
    let id = RecordId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn record_id_display_and_parse() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn record_id_parse_trims_whitespace() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&format!("  {id}\n")).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn record_id_parse_invalid() {
    assert!(RecordId::parse("001xx000003DGb2AAG").is_err());
    assert!(RecordId::from_str("").is_err());
}

#[test]
fn record_ids_are_distinct() {
    let ids: Vec<RecordId> = (0..16).map(|_| RecordId::new()).collect();
    let sorted: BTreeSet<RecordId> = ids.iter().copied().collect();
    assert_eq!(sorted.len(), ids.len());
}

#[test]
fn record_id_serializes_transparently() {
    let id = RecordId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
}

// ── DocumentId / LinkId ──────────────────────────────────────────

#[test]
fn document_id_hash_and_eq() {
    let id = DocumentId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn link_id_default_is_unique() {
    assert_ne!(LinkId::default(), LinkId::default());
}
