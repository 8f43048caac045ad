mod common;

use common::{DC, EDIT_PACKET, PHOTO_PACKET, XMP};
use pretty_assertions::assert_eq;
use xmpbridge::engine::{BasicEngine, MetadataEngine};
use xmpbridge::session::merge::{parse_in_chunks, replace_or_merge};
use xmpbridge::{OpenFlags, Toolkit, WriteMode, XmpError};

fn engine() -> BasicEngine {
    let engine = BasicEngine::new();
    engine.initialize_document_model().unwrap();
    engine
}

fn value(
    engine: &BasicEngine,
    doc: &xmpbridge::core::XmpDocument,
    ns: &str,
    name: &str,
) -> Option<String> {
    engine
        .get_property(doc, ns, name)
        .unwrap()
        .map(|(value, _)| value)
}

#[test]
fn test_override_replaces_everything() {
    let engine = engine();
    let mut current = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();

    replace_or_merge(&engine, &mut current, Some(EDIT_PACKET.as_bytes()), WriteMode::Override)
        .unwrap();

    assert_eq!(value(&engine, &current, XMP, "Rating").as_deref(), Some("5"));
    assert_eq!(value(&engine, &current, XMP, "Label").as_deref(), Some("Edited"));
    assert_eq!(value(&engine, &current, XMP, "CreatorTool"), None);
    assert_eq!(value(&engine, &current, DC, "title"), None);
    assert_eq!(value(&engine, &current, DC, "subject"), None);
    assert!(value(&engine, &current, XMP, "MetadataDate").is_some());
}

#[test]
fn test_override_without_incoming_clears_document() {
    let engine = engine();
    let mut current = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();

    replace_or_merge(&engine, &mut current, None, WriteMode::Override).unwrap();

    assert_eq!(current.len(), 0);
    assert_eq!(value(&engine, &current, XMP, "MetadataDate"), None);
}

#[test]
fn test_upsert_keeps_unrelated_properties() {
    let engine = engine();
    let mut current = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();

    replace_or_merge(&engine, &mut current, Some(EDIT_PACKET.as_bytes()), WriteMode::Upsert)
        .unwrap();

    assert_eq!(value(&engine, &current, XMP, "Rating").as_deref(), Some("5"));
    assert_eq!(value(&engine, &current, XMP, "Label").as_deref(), Some("Edited"));
    assert_eq!(
        value(&engine, &current, XMP, "CreatorTool").as_deref(),
        Some("Camera 1.0")
    );
    assert!(value(&engine, &current, DC, "title").is_some());
    assert_eq!(value(&engine, &current, XMP, "MetadataDate"), None);
}

#[test]
fn test_upsert_ignores_empty_values() {
    let engine = engine();
    let mut current = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();
    let blanks = EDIT_PACKET.replace(
        "<xmp:Label>Edited</xmp:Label>",
        "<xmp:CreatorTool></xmp:CreatorTool>\n      <xmp:Nickname></xmp:Nickname>",
    );

    replace_or_merge(&engine, &mut current, Some(blanks.as_bytes()), WriteMode::Upsert).unwrap();

    assert_eq!(value(&engine, &current, XMP, "Rating").as_deref(), Some("5"));
    assert_eq!(
        value(&engine, &current, XMP, "CreatorTool").as_deref(),
        Some("Camera 1.0")
    );
    assert_eq!(value(&engine, &current, XMP, "Nickname"), None);
}

#[test]
fn test_empty_buffer_is_no_incoming() {
    let engine = engine();
    let original = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();

    let mut upserted = original.clone();
    replace_or_merge(&engine, &mut upserted, Some(&[][..]), WriteMode::Upsert).unwrap();
    assert_eq!(upserted, original);

    let mut replaced = original.clone();
    replace_or_merge(&engine, &mut replaced, Some(&[][..]), WriteMode::Override).unwrap();
    assert_eq!(replaced.len(), 0);
}

#[test]
fn test_chunk_size_does_not_change_result() {
    let engine = engine();
    let whole = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), PHOTO_PACKET.len() + 1).unwrap();
    let expected = engine.serialize(&whole).unwrap();

    for chunk_size in [1, 7, 64, 4096] {
        let doc = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), chunk_size).unwrap();
        assert_eq!(engine.serialize(&doc).unwrap(), expected, "chunk size {}", chunk_size);
    }
}

#[test]
fn test_packet_larger_than_one_chunk() {
    let engine = engine();
    let long_label = "x".repeat(10_000);
    let packet = EDIT_PACKET.replace("Edited", &long_label);

    let doc = parse_in_chunks(&engine, packet.as_bytes(), 4096).unwrap();
    assert_eq!(value(&engine, &doc, XMP, "Label"), Some(long_label));
}

#[test]
fn test_structured_value_is_rejected() {
    let engine = engine();
    let mut current = parse_in_chunks(&engine, PHOTO_PACKET.as_bytes(), 4096).unwrap();
    let before = current.clone();
    let structured = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:Thumbnails rdf:parseType="Resource"><xmp:width>1</xmp:width></xmp:Thumbnails>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

    let err = replace_or_merge(
        &engine,
        &mut current,
        Some(structured.as_bytes()),
        WriteMode::Upsert,
    )
    .unwrap_err();
    assert!(matches!(err, XmpError::Parse(_)));
    assert_eq!(current, before);
}

#[test]
fn test_session_merge_writes_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());

    let mut session = toolkit.session();
    session
        .open_with(&path, OpenFlags::default().for_update().use_smart_handler())
        .unwrap();
    session
        .replace_or_merge(Some(EDIT_PACKET.as_bytes()), WriteMode::Upsert)
        .unwrap();
    session.commit().unwrap();
    session.try_close().unwrap();

    session.open(&path).unwrap();
    assert_eq!(session.property(XMP, "Label").unwrap().value, "Edited");
    assert_eq!(session.property(XMP, "CreatorTool").unwrap().value, "Camera 1.0");
}
