use mergelink_types::{
    DocumentId, Error, FileLink, LinkId, NewFileLink, RecordId, ShareType, Visibility,
};

fn make_link(share_type: ShareType, visibility: Visibility) -> FileLink {
    FileLink {
        id: LinkId::new(),
        linked_entity: RecordId::new(),
        content_document: DocumentId::new(),
        share_type,
        visibility,
        is_deleted: false,
    }
}

// ── ShareType ────────────────────────────────────────────────────

#[test]
fn share_type_codes() {
    assert_eq!(ShareType::Viewer.code(), "V");
    assert_eq!(ShareType::Collaborator.code(), "C");
    assert_eq!(ShareType::Inferred.code(), "I");
    assert_eq!("C".parse::<ShareType>().unwrap(), ShareType::Collaborator);
}

#[test]
fn share_type_rejects_unknown_code() {
    let err = "X".parse::<ShareType>().unwrap_err();
    assert!(matches!(err, Error::InvalidShareType(ref s) if s == "X"));
    assert!(format!("{err}").contains("X"));
}

#[test]
fn share_type_serializes_as_code() {
    assert_eq!(serde_json::to_string(&ShareType::Viewer).unwrap(), "\"V\"");
}

// ── Visibility ───────────────────────────────────────────────────

#[test]
fn visibility_parse_and_display() {
    for v in [Visibility::AllUsers, Visibility::InternalUsers, Visibility::SharedUsers] {
        assert_eq!(v.to_string().parse::<Visibility>().unwrap(), v);
    }
    assert!("Everyone".parse::<Visibility>().is_err());
}

// ── FileLink ─────────────────────────────────────────────────────

#[test]
fn retarget_copies_policy_fields() {
    let link = make_link(ShareType::Collaborator, Visibility::InternalUsers);
    let master = RecordId::new();

    let new_link = link.retarget(master);
    assert_eq!(new_link.linked_entity, master);
    assert_eq!(new_link.content_document, link.content_document);
    assert_eq!(new_link.share_type, ShareType::Collaborator);
    assert_eq!(new_link.visibility, Visibility::InternalUsers);
}

#[test]
fn new_link_key_is_entity_and_document() {
    let entity = RecordId::new();
    let doc = DocumentId::new();
    let link = NewFileLink::new(entity, doc, ShareType::Viewer, Visibility::AllUsers);
    assert_eq!(link.key(), (entity, doc));
}

#[test]
fn file_link_json_uses_camel_case() {
    let link = make_link(ShareType::Viewer, Visibility::AllUsers);
    let json = serde_json::to_value(&link).unwrap();
    assert!(json.get("linkedEntity").is_some());
    assert!(json.get("contentDocument").is_some());
    assert_eq!(json["shareType"], "V");
    assert_eq!(json["visibility"], "AllUsers");
    assert_eq!(json["isDeleted"], false);
}
