//! Snapshot Tests
//!
//! Tests verify:
//! - Save/load round trip including deadlines
//! - Missing snapshot file is not an error
//! - Overwrite semantics and temp file cleanup
//! - Corruption detection
//! - Concurrent saves never leave an older copy on disk

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use memkv::snapshot::{decode, encode, Snapshot, HEADER_SIZE};
use memkv::store::{Entry, EntryMap, Store, Ttl};
use memkv::MemKvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_snapshot() -> (TempDir, Snapshot) {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = Snapshot::new(temp_dir.path().join("MemStore"));
    (temp_dir, snapshot)
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_save_then_load_reproduces_mapping() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("a", "1");
    store.set("b", "two words? no, one");
    store.set("c", "3");
    store.expire("c", 500).unwrap();

    let info = snapshot.save(&store).unwrap();
    assert_eq!(info.entry_count, 3);
    assert!(snapshot.exists());

    let restored = Store::new();
    let loaded = snapshot.load(&restored).unwrap().unwrap();

    assert_eq!(loaded.entry_count, 3);
    assert_eq!(restored.entries(), store.entries());
    assert_eq!(restored.ttl("a"), Ttl::Persistent);
    assert!(matches!(restored.ttl("c"), Ttl::Remaining(_)));
}

#[test]
fn test_round_trip_preserves_exact_deadline() {
    let (_temp, snapshot) = setup_snapshot();

    let deadline = SystemTime::now() + Duration::from_nanos(123_456_789_012);
    let mut entries = EntryMap::new();
    entries.insert("k".to_string(), Entry::with_deadline("v", deadline));
    snapshot.write_entries(&entries).unwrap();

    let (read, _) = snapshot.read_entries().unwrap().unwrap();
    assert_eq!(read["k"].expires_at, Some(deadline));
}

#[test]
fn test_round_trip_preserves_insertion_order() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("zeta", "1");
    store.set("alpha", "2");
    store.set("mid", "3");
    snapshot.save(&store).unwrap();

    let restored = Store::new();
    snapshot.load(&restored).unwrap();

    let keys: Vec<String> = restored.entries().keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(restored.list(), store.list());
}

#[test]
fn test_save_empty_store() {
    let (_temp, snapshot) = setup_snapshot();

    let info = snapshot.save(&Store::new()).unwrap();
    assert_eq!(info.entry_count, 0);

    let restored = Store::new();
    restored.set("x", "y");
    snapshot.load(&restored).unwrap();

    // Load replaces wholesale
    assert!(restored.is_empty());
}

#[test]
fn test_expired_entries_load_and_sweep_away() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("old", "v");
    store.expire("old", -10).unwrap();
    snapshot.save(&store).unwrap();

    let restored = Store::new();
    snapshot.load(&restored).unwrap();

    assert!(restored.contains_key("old"));
    assert_eq!(restored.sweep_expired(), 1);
}

// =============================================================================
// Missing / Overwrite Tests
// =============================================================================

#[test]
fn test_load_missing_file_is_not_an_error() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("keep", "me");

    assert!(snapshot.load(&store).unwrap().is_none());
    assert_eq!(store.get("keep"), Some("me".to_string()));
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("first", "1");
    snapshot.save(&store).unwrap();

    store.delete("first");
    store.set("second", "2");
    snapshot.save(&store).unwrap();

    let restored = Store::new();
    snapshot.load(&restored).unwrap();
    assert_eq!(restored.get("first"), None);
    assert_eq!(restored.get("second"), Some("2".to_string()));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("a", "1");
    snapshot.save(&store).unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["MemStore".to_string()]);
}

#[test]
fn test_save_creates_parent_directory() {
    let temp = TempDir::new().unwrap();
    let snapshot = Snapshot::new(temp.path().join("nested").join("dir").join("MemStore"));

    snapshot.save(&Store::new()).unwrap();
    assert!(snapshot.exists());
}

#[test]
fn test_save_excludes_pending_operations() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("committed", "1");
    store.begin();
    store.set("staged", "2");
    snapshot.save(&store).unwrap();

    let restored = Store::new();
    snapshot.load(&restored).unwrap();
    assert_eq!(restored.get("committed"), Some("1".to_string()));
    assert_eq!(restored.get("staged"), None);
}

#[test]
fn test_load_keeps_transaction_state() {
    let (_temp, snapshot) = setup_snapshot();
    snapshot.save(&Store::new()).unwrap();

    let store = Store::new();
    store.begin();
    store.set("staged", "1");
    snapshot.load(&store).unwrap();

    assert!(store.in_transaction());
    assert_eq!(store.pending_len(), 1);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupted_payload_is_detected() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("a", "1");
    snapshot.save(&store).unwrap();

    let mut bytes = fs::read(snapshot.path()).unwrap();
    bytes[HEADER_SIZE] ^= 0xFF;
    fs::write(snapshot.path(), &bytes).unwrap();

    let result = snapshot.load(&Store::new());
    assert!(matches!(result, Err(MemKvError::SnapshotCorruption(_))));
}

#[test]
fn test_truncated_file_is_detected() {
    let (_temp, snapshot) = setup_snapshot();

    let store = Store::new();
    store.set("a", "1");
    snapshot.save(&store).unwrap();

    let bytes = fs::read(snapshot.path()).unwrap();
    fs::write(snapshot.path(), &bytes[..bytes.len() - 3]).unwrap();

    assert!(matches!(
        snapshot.load(&Store::new()),
        Err(MemKvError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_bad_magic_is_detected() {
    let mut bytes = encode(&EntryMap::new()).unwrap();
    bytes[0] = b'X';

    assert!(matches!(decode(&bytes), Err(MemKvError::SnapshotCorruption(_))));
}

#[test]
fn test_tiny_file_is_detected() {
    assert!(matches!(decode(b"MKVS"), Err(MemKvError::SnapshotCorruption(_))));
}

#[test]
fn test_failed_load_leaves_store_untouched() {
    let (_temp, snapshot) = setup_snapshot();
    fs::write(snapshot.path(), b"not a snapshot at all, just some text").unwrap();

    let store = Store::new();
    store.set("keep", "me");

    assert!(snapshot.load(&store).is_err());
    assert_eq!(store.get("keep"), Some("me".to_string()));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_saves_keep_latest_state() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = Arc::new(Snapshot::new(temp_dir.path().join("MemStore")));
    let store = Arc::new(Store::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let snapshot = Arc::clone(&snapshot);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.set(format!("writer-{}", t), i.to_string());
                    snapshot.save(&store).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every writer saved after its last set, so the final file is current
    let (on_disk, _) = snapshot.read_entries().unwrap().unwrap();
    assert_eq!(on_disk, store.entries());
    for t in 0..4 {
        assert_eq!(on_disk[&format!("writer-{}", t)].value, "24");
    }
}
