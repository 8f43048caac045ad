mod common;

use common::{CountingEngine, Probe, DC, PHOTO_PACKET, XMP};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::atomic::Ordering;
use xmpbridge::{BasicEngine, OpenFlags, PropertyOptions, Toolkit, XmpError};

fn update_flags() -> OpenFlags {
    OpenFlags::default().for_update().use_smart_handler()
}

#[test]
fn test_metadata_loads_once_per_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let (engine, probe) = CountingEngine::new();
    let toolkit = Toolkit::new(engine);

    let mut session = toolkit.session();
    session.open(&path).unwrap();
    assert!(!session.is_loaded());
    assert_eq!(Probe::count(&probe.loads), 0);

    session.property(XMP, "Rating").unwrap();
    session.property(XMP, "CreatorTool").unwrap();
    session.load().unwrap();
    assert!(session.is_loaded());
    assert_eq!(Probe::count(&probe.loads), 1);

    session.try_close().unwrap();
    session.open(&path).unwrap();
    session.load().unwrap();
    assert_eq!(Probe::count(&probe.loads), 2);
}

#[test]
fn test_loaded_document_ignores_later_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let (engine, probe) = CountingEngine::new();
    let toolkit = Toolkit::new(engine);

    let mut session = toolkit.session();
    session.open(&path).unwrap();
    session.load().unwrap();
    fs::write(&path, PHOTO_PACKET.replace(">3<", ">1<")).unwrap();

    session.load().unwrap();
    assert_eq!(session.property(XMP, "Rating").unwrap().value, "3");
    assert_eq!(Probe::count(&probe.loads), 1);

    session.try_close().unwrap();
    session.open(&path).unwrap();
    assert_eq!(session.property(XMP, "Rating").unwrap().value, "1");
    assert_eq!(Probe::count(&probe.loads), 2);
}

#[test]
fn test_property_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());
    let mut session = toolkit.session();
    session.open(&path).unwrap();

    let tool = session.property(XMP, "CreatorTool").unwrap();
    assert!(tool.exists);
    assert_eq!(tool.value, "Camera 1.0");

    let subject = session.property(DC, "subject").unwrap();
    assert!(subject.exists);
    assert_eq!(subject.value, "");
    assert!(subject.options.contains(PropertyOptions::VALUE_IS_ARRAY));

    let missing = session.property(XMP, "Nickname").unwrap();
    assert!(!missing.exists);
    assert_eq!(missing.value, "");
}

#[test]
fn test_localized_text_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());
    let mut session = toolkit.session();
    session.open(&path).unwrap();

    let french = session.localized_text(DC, "title", None, "fr-FR").unwrap();
    assert!(french.exists);
    assert_eq!(french.value, "Port");
    assert_eq!(french.actual_lang, "fr-fr");

    let fallback = session.localized_text(DC, "title", Some("de"), "de-DE").unwrap();
    assert!(fallback.exists);
    assert_eq!(fallback.value, "Harbor");
    assert_eq!(fallback.actual_lang, "x-default");

    let absent = session.localized_text(DC, "description", None, "en-US").unwrap();
    assert!(!absent.exists);
}

#[test]
fn test_open_twice_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());
    let mut session = toolkit.session();

    session.open(&path).unwrap();
    let err = session.open(&path).unwrap_err();
    assert!(matches!(err, XmpError::Usage(_)));
    assert!(session.is_open());
}

#[test]
fn test_failed_open_stays_closed() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = Toolkit::new(BasicEngine::new());
    let mut session = toolkit.session();

    let err = session.open(dir.path().join("missing.xmp")).unwrap_err();
    assert!(matches!(err, XmpError::Io(_)));
    assert!(!session.is_open());
    assert!(matches!(session.property(XMP, "Rating"), Err(XmpError::Usage(_))));
}

#[test]
fn test_failed_load_closes_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let (engine, probe) = CountingEngine::new();
    probe.fail_get_xmp.store(true, Ordering::SeqCst);
    let toolkit = Toolkit::new(engine);

    let mut session = toolkit.session();
    session.open(&path).unwrap();
    let err = session.property(XMP, "Rating").unwrap_err();
    assert!(matches!(err, XmpError::MetadataLoad(_)));
    assert!(!session.is_open());

    probe.fail_get_xmp.store(false, Ordering::SeqCst);
    session.open(&path).unwrap();
    assert_eq!(session.property(XMP, "Rating").unwrap().value, "3");
}

#[test]
fn test_set_and_commit_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());

    let mut session = toolkit.session();
    session.open_with(&path, update_flags()).unwrap();
    session.set_property(XMP, "Rating", 5).unwrap();
    session.set_property(XMP, "Marked", true).unwrap();
    session.delete_property(XMP, "CreatorTool").unwrap();
    session
        .set_localized_text(DC, "title", None, "de-DE", "Hafen", PropertyOptions::default())
        .unwrap();
    session.commit().unwrap();
    session.try_close().unwrap();

    session.open(&path).unwrap();
    assert_eq!(session.property(XMP, "Rating").unwrap().value, "5");
    assert_eq!(session.property(XMP, "Marked").unwrap().value, "True");
    assert!(!session.property(XMP, "CreatorTool").unwrap().exists);
    let german = session.localized_text(DC, "title", None, "de-DE").unwrap();
    assert_eq!(german.value, "Hafen");
}

#[test]
fn test_refused_commit_carries_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let (engine, probe) = CountingEngine::new();
    probe.refuse_put.store(true, Ordering::SeqCst);
    let toolkit = Toolkit::new(engine);

    let mut session = toolkit.session();
    session.open_with(&path, update_flags()).unwrap();
    session.set_property(XMP, "Rating", 1).unwrap();
    let err = session.commit().unwrap_err();

    assert!(matches!(err, XmpError::MetadataWrite { .. }));
    let payload = err.payload().unwrap();
    assert!(payload.contains("<xmp:Rating>1</xmp:Rating>"));
    session.try_close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), PHOTO_PACKET);
}

#[test]
fn test_read_only_commit_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());

    let mut session = toolkit.session();
    session.open(&path).unwrap();
    session.set_property(XMP, "Rating", 1).unwrap();
    assert!(matches!(
        session.commit(),
        Err(XmpError::MetadataWrite { .. })
    ));
}

#[test]
fn test_drop_flushes_committed_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());

    {
        let mut session = toolkit.session();
        session.open_with(&path, update_flags()).unwrap();
        session.set_property(XMP, "Label", "Dropped").unwrap();
        session.commit().unwrap();
    }

    assert!(fs::read_to_string(&path)
        .unwrap()
        .contains("<xmp:Label>Dropped</xmp:Label>"));
}

#[test]
fn test_empty_sidecar_loads_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "empty.xmp", "");
    let toolkit = Toolkit::new(BasicEngine::new());

    let mut session = toolkit.session();
    session.open(&path).unwrap();
    assert!(!session.property(XMP, "Rating").unwrap().exists);
    assert!(!session.packet_info().unwrap().is_located());
}
