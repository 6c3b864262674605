//! Store Tests
//!
//! Tests verify:
//! - Basic get/set/delete operations
//! - TTL reporting
//! - List and sort rendering
//! - Concurrent access through the single lock

use std::sync::Arc;
use std::thread;

use memkv::store::{KeyStatus, Store, Ttl, EMPTY_DUMP, ENTRY_PREFIX};

// =============================================================================
// Helper Functions
// =============================================================================

/// Keys of a rendered dump, top to bottom
fn dump_keys(dump: &str) -> Vec<String> {
    dump.lines()
        .filter(|l| !l.is_empty())
        .map(|l| l.trim_start_matches(ENTRY_PREFIX).split(' ').next().unwrap().to_string())
        .collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = Store::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(!store.in_transaction());
}

#[test]
fn test_get_nonexistent_key() {
    let store = Store::new();
    assert_eq!(store.get("missing"), None);
}

#[test]
fn test_set_and_get() {
    let store = Store::new();

    store.set("hello", "world");

    assert_eq!(store.get("hello"), Some("world".to_string()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_set_overwrites_existing() {
    let store = Store::new();

    store.set("key", "value1");
    store.set("key", "value2");

    assert_eq!(store.get("key"), Some("value2".to_string()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_empty_value_is_stored() {
    let store = Store::new();

    store.set("key", "");

    assert_eq!(store.get("key"), Some(String::new()));
}

#[test]
fn test_delete_existing_key() {
    let store = Store::new();
    store.set("key", "value");

    assert_eq!(store.delete("key"), KeyStatus::Ok);
    assert_eq!(store.get("key"), None);
}

#[test]
fn test_delete_nonexistent_key() {
    let store = Store::new();
    store.set("other", "value");

    assert_eq!(store.delete("missing"), KeyStatus::NotFound);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("other"), Some("value".to_string()));
}

#[test]
fn test_delete_twice() {
    let store = Store::new();
    store.set("key", "value");

    assert_eq!(store.delete("key"), KeyStatus::Ok);
    assert_eq!(store.delete("key"), KeyStatus::NotFound);
}

// =============================================================================
// Expire / TTL Tests
// =============================================================================

#[test]
fn test_ttl_missing_key() {
    let store = Store::new();
    assert_eq!(store.ttl("missing"), Ttl::Missing);
    assert_eq!(store.ttl("missing").to_string(), "-2");
}

#[test]
fn test_ttl_without_expiration() {
    let store = Store::new();
    store.set("key", "value");

    assert_eq!(store.ttl("key"), Ttl::Persistent);
    assert_eq!(store.ttl("key").to_string(), "-1");
}

#[test]
fn test_expire_sets_remaining_time() {
    let store = Store::new();
    store.set("key", "value");

    assert_eq!(store.expire("key", 100).unwrap(), KeyStatus::Ok);

    let remaining = store.ttl("key").as_secs_f64();
    assert!(remaining > 99.0 && remaining <= 100.0, "got {}", remaining);
}

#[test]
fn test_expire_missing_key() {
    let store = Store::new();
    assert_eq!(store.expire("missing", 10).unwrap(), KeyStatus::NotFound);
    assert!(store.is_empty());
}

#[test]
fn test_expire_negative_reports_zero_ttl() {
    let store = Store::new();
    store.set("key", "value");

    assert_eq!(store.expire("key", -5).unwrap(), KeyStatus::Ok);

    // Still readable until the sweep runs
    assert_eq!(store.get("key"), Some("value".to_string()));
    assert_eq!(store.ttl("key").as_secs_f64(), 0.0);
}

#[test]
fn test_set_clears_ttl() {
    let store = Store::new();
    store.set("key", "value");
    store.expire("key", 100).unwrap();

    store.set("key", "new");

    assert_eq!(store.ttl("key"), Ttl::Persistent);
}

#[test]
fn test_ttl_decreases_over_time() {
    let store = Store::new();
    store.set("key", "value");
    store.expire("key", 10).unwrap();

    let first = store.ttl("key").as_secs_f64();
    thread::sleep(std::time::Duration::from_millis(20));
    let second = store.ttl("key").as_secs_f64();

    assert!(second < first);
}

#[test]
fn test_expire_out_of_range_is_rejected() {
    let store = Store::new();
    store.set("key", "value");

    assert!(store.expire("key", i64::MAX).is_err());
    assert_eq!(store.ttl("key"), Ttl::Persistent);
}

// =============================================================================
// Rendering Tests
// =============================================================================

#[test]
fn test_list_empty() {
    let store = Store::new();
    assert_eq!(store.list(), EMPTY_DUMP);
    assert_eq!(store.sort(), EMPTY_DUMP);
}

#[test]
fn test_list_renders_every_entry() {
    let store = Store::new();
    store.set("b", "2");
    store.set("a", "1");

    let dump = store.list();

    assert_eq!(
        dump,
        format!(
            "\n{p}b {{value: \"2\", expires_at: none}}\n{p}a {{value: \"1\", expires_at: none}}\n",
            p = ENTRY_PREFIX
        )
    );
}

#[test]
fn test_list_follows_insertion_order() {
    let store = Store::new();
    store.set("z", "1");
    store.set("a", "2");
    store.set("m", "3");

    assert_eq!(dump_keys(&store.list()), vec!["z", "a", "m"]);
}

#[test]
fn test_overwrite_keeps_position() {
    let store = Store::new();
    store.set("first", "1");
    store.set("second", "2");
    store.set("first", "updated");

    assert_eq!(dump_keys(&store.list()), vec!["first", "second"]);
}

#[test]
fn test_delete_keeps_remaining_order() {
    let store = Store::new();
    store.set("c", "1");
    store.set("a", "2");
    store.set("b", "3");
    store.delete("a");

    assert_eq!(dump_keys(&store.list()), vec!["c", "b"]);

    // Re-added keys go to the end
    store.set("a", "4");
    assert_eq!(dump_keys(&store.list()), vec!["c", "b", "a"]);
}

#[test]
fn test_committed_delete_keeps_remaining_order() {
    let store = Store::new();
    store.set("c", "1");
    store.set("a", "2");
    store.set("b", "3");

    store.begin();
    store.delete("c");
    store.set("d", "4");
    store.commit();

    assert_eq!(dump_keys(&store.list()), vec!["a", "b", "d"]);
}

#[test]
fn test_list_shows_expiration() {
    let store = Store::new();
    store.set("key", "value");
    store.expire("key", 60).unwrap();

    let dump = store.list();

    assert!(dump.contains("key {value: \"value\", expires_at: "));
    assert!(!dump.contains("none"));
}

#[test]
fn test_sort_orders_by_value_not_key() {
    let store = Store::new();
    store.set("x", "b");
    store.set("y", "a");

    let dump = store.sort();

    let y = dump.find(&format!("{}y ", ENTRY_PREFIX)).unwrap();
    let x = dump.find(&format!("{}x ", ENTRY_PREFIX)).unwrap();
    assert!(y < x, "expected y before x in {:?}", dump);
}

#[test]
fn test_sort_ties_keep_insertion_order() {
    let store = Store::new();
    store.set("c", "same");
    store.set("a", "same");
    store.set("b", "first");

    assert_eq!(dump_keys(&store.sort()), vec!["b", "c", "a"]);
}

#[test]
fn test_sort_ties_ignore_key_order() {
    let store = Store::new();
    store.set("b", "x");
    store.set("a", "x");

    assert_eq!(dump_keys(&store.sort()), vec!["b", "a"]);
}

#[test]
fn test_sort_matches_list_rendering() {
    let store = Store::new();
    store.set("a", "1");
    store.set("b", "2");

    // Already ordered by value, so both dumps agree
    assert_eq!(store.sort(), store.list());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers() {
    let store = Arc::new(Store::new());
    let mut handles = Vec::new();

    for t in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                store.set(format!("key-{}-{}", t, i), format!("{}", i));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 800);
    assert_eq!(store.get("key-7-99"), Some("99".to_string()));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let store = Arc::new(Store::new());
    store.set("shared", "0");

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..500 {
                store.set("shared", i.to_string());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    let value = store.get("shared").unwrap();
                    assert!(value.parse::<u32>().unwrap() < 500);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.get("shared"), Some("499".to_string()));
}
