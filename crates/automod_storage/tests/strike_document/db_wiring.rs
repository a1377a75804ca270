#![forbid(unsafe_code)]

use automod_kernel_contracts::strike::{StrikeEntry, StrikeRecord};
use automod_kernel_contracts::{ActorId, UnixTimeMs};
use automod_storage::document::{DocumentStore, JsonFileStore, MemoryStore};
use automod_storage::documents::StrikeDocument;
use automod_storage::paths::strikes_path_in;

fn record(stamps: &[u64]) -> StrikeRecord {
    StrikeRecord {
        strikes: stamps.len() as u32,
        violations: stamps
            .iter()
            .map(|ms| StrikeEntry {
                timestamp_ms: UnixTimeMs(*ms),
                reason: "Contains prohibited content".to_string(),
            })
            .collect(),
    }
}

#[test]
fn at_strike_document_01_file_round_trip_keeps_every_actor() {
    let dir = tempfile::tempdir().unwrap();
    let store: JsonFileStore<StrikeDocument> = JsonFileStore::new(strikes_path_in(dir.path()));
    let mut doc = StrikeDocument::default();
    doc.strikes.insert(ActorId::new("100").unwrap(), record(&[1_000]));
    doc.strikes.insert(ActorId::new("200").unwrap(), record(&[1_000, 2_000]));
    store.save(&doc).unwrap();

    let loaded = store.load_or_default();
    assert_eq!(loaded.strikes.len(), 2);
    assert_eq!(loaded.strikes[&ActorId::new("200").unwrap()].strikes, 2);
}

#[test]
fn at_strike_document_02_legacy_snake_case_key_is_accepted() {
    let raw = r#"{"automod_strikes": {"7": {"strikes": 1, "violations": [{"timestamp_ms": 5, "reason": "x"}]}}}"#;
    let doc: StrikeDocument = serde_json::from_str(raw).unwrap();
    assert_eq!(doc.strikes[&ActorId::new("7").unwrap()], {
        let mut r = record(&[5]);
        r.violations[0].reason = "x".to_string();
        r
    });
}

#[test]
fn at_strike_document_03_invalid_actor_key_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = strikes_path_in(dir.path());
    std::fs::write(&path, r#"{"automodStrikes": {"bad id": {"strikes": 0}}}"#).unwrap();
    let store: JsonFileStore<StrikeDocument> = JsonFileStore::new(&path);
    assert!(store.load().is_err());
    assert!(store.load_or_default().strikes.is_empty());
}

#[test]
fn at_strike_document_04_memory_store_starts_empty() {
    let store: MemoryStore<StrikeDocument> = MemoryStore::new();
    assert!(store.load_or_default().strikes.is_empty());
    assert_eq!(store.save_count(), 0);
}
