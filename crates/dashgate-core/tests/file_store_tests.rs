//! Tests durable file-backed storage across reopen.

use dashgate_core::{
    CoreError, FileStore, KeyValueStore, ThemeMode, User, read_session_record, read_theme,
    write_session_record, write_theme,
};

#[test]
fn file_store_tests_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("nested").join("storage.json");

    let store = FileStore::open(&path).expect("missing file should open empty");
    write_session_record(&store, &User::new("demo@example.com", "David"))
        .expect("session should persist");
    write_theme(&store, ThemeMode::Dark).expect("theme should persist");

    let reopened = FileStore::open(&path).expect("written file should reopen");
    assert_eq!(
        read_session_record(&reopened).expect("record should decode"),
        Some(User::new("demo@example.com", "David"))
    );
    assert_eq!(read_theme(&reopened).unwrap(), Some(ThemeMode::Dark));
}

#[test]
fn file_store_tests_remove_is_durable() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("storage.json");

    let store = FileStore::open(&path).unwrap();
    store.set("theme", "light").unwrap();
    store.remove("theme").unwrap();
    store.remove("never-set").unwrap();

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("theme").unwrap(), None);
}

#[test]
fn file_store_tests_report_corrupt_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(matches!(FileStore::open(&path), Err(CoreError::Codec(_))));

    let fresh = FileStore::empty(&path);
    assert_eq!(fresh.get("theme").unwrap(), None);
    fresh.set("theme", "dark").unwrap();
    assert_eq!(
        FileStore::open(&path).unwrap().get("theme").unwrap().as_deref(),
        Some("dark")
    );
}
