mod common;

use common::{EDIT_PACKET, PHOTO_PACKET, XMP};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::thread;
use xmpbridge::{BasicEngine, Toolkit, WriteMode};

#[test]
fn test_concurrent_writes_to_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = Toolkit::new(BasicEngine::new());
    let paths: Vec<_> = (0..8)
        .map(|i| common::sidecar(dir.path(), &format!("photo{}.xmp", i), PHOTO_PACKET))
        .collect();

    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, path)| {
            let toolkit = toolkit.clone();
            thread::spawn(move || {
                let packet = EDIT_PACKET.replace("Edited", &format!("Worker {}", i));
                toolkit.write_xmp_to_file(&path, Some(packet.as_bytes()), WriteMode::Upsert)
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    for (i, path) in paths.iter().enumerate() {
        let mut session = toolkit.session();
        session.open(path).unwrap();
        assert_eq!(
            session.property(XMP, "Label").unwrap().value,
            format!("Worker {}", i)
        );
        assert_eq!(session.property(XMP, "CreatorTool").unwrap().value, "Camera 1.0");
    }
}

#[test]
fn test_session_shared_behind_mutex() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::sidecar(dir.path(), "photo.xmp", PHOTO_PACKET);
    let toolkit = Toolkit::new(BasicEngine::new());
    let mut session = toolkit.session();
    session.open(&path).unwrap();
    let session = Arc::new(Mutex::new(session));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let mut session = session.lock().unwrap();
                session.property(XMP, "Rating").unwrap().value
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "3");
    }
}
