#![forbid(unsafe_code)]

use std::fs;

use automod_kernel_contracts::config::ModerationAction;
use automod_storage::document::{DocumentStore, JsonFileStore, StoreError};
use automod_storage::documents::ConfigDocument;
use automod_storage::paths::config_path_in;

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn at_json_store_01_missing_file_loads_as_none_and_defaults() {
    let dir = temp_dir();
    let store: JsonFileStore<ConfigDocument> = JsonFileStore::new(config_path_in(dir.path()));
    assert!(store.load().unwrap().is_none());
    let doc = store.load_or_default();
    assert!(doc.automod.enabled);
    assert!(!store.path().exists());
}

#[test]
fn at_json_store_02_save_then_load_preserves_document() {
    let dir = temp_dir();
    let store: JsonFileStore<ConfigDocument> = JsonFileStore::new(config_path_in(dir.path()));
    let mut doc = ConfigDocument::default();
    doc.automod.spam.message_limit = 9;
    doc.automod.caps.action = ModerationAction::Kick;
    doc.other
        .insert("welcome".to_string(), serde_json::json!({"channel": "123"}));
    store.save(&doc).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn at_json_store_03_corrupt_file_is_an_error_but_defaults_on_load_or_default() {
    let dir = temp_dir();
    let path = config_path_in(dir.path());
    fs::write(&path, "{ not json").unwrap();
    let store: JsonFileStore<ConfigDocument> = JsonFileStore::new(&path);
    assert!(matches!(store.load(), Err(StoreError::Json { .. })));
    assert_eq!(store.load_or_default(), ConfigDocument::default());
}

#[test]
fn at_json_store_04_whitespace_only_file_reads_as_empty() {
    let dir = temp_dir();
    let path = config_path_in(dir.path());
    fs::write(&path, "  \n").unwrap();
    let store: JsonFileStore<ConfigDocument> = JsonFileStore::new(&path);
    assert!(store.load().unwrap().is_none());
}

#[test]
fn at_json_store_05_save_creates_missing_parent_dirs_and_leaves_no_temp_files() {
    let dir = temp_dir();
    let nested = dir.path().join("a").join("b");
    let store: JsonFileStore<ConfigDocument> = JsonFileStore::new(config_path_in(&nested));
    store.save(&ConfigDocument::default()).unwrap();
    store.save(&ConfigDocument::default()).unwrap();
    let entries: Vec<_> = fs::read_dir(&nested).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
