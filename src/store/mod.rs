//! Store Module
//!
//! The in-memory key → entry map and the store-wide transaction buffer.
//!
//! ## Responsibilities
//! - Get/set/delete values
//! - Per-key absolute expiration and TTL queries
//! - Buffer mutations while a transaction is active
//! - Render the whole store (`list`) or the store ordered by value (`sort`)
//! - Evict expired keys when asked (`sweep_expired`)
//!
//! ## Data Structure Choice
//! An `IndexMap` behind one `parking_lot::Mutex`:
//! - Keys iterate in first-insertion order, for `list` and for `sort` ties
//! - Overwriting a key keeps its position; removal keeps the others in order
//! - One lock covers entries and transaction state, so every operation is
//!   linearizable with respect to every other

mod entry;
mod expiry;
mod transaction;

use std::time::SystemTime;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::Result;

pub use entry::{Entry, Ttl};
pub use expiry::deadline_after;
pub use transaction::{Operation, TransactionBuffer};

/// Committed entries in first-insertion order
pub type EntryMap = IndexMap<String, Entry>;

/// Rendered when `list`/`sort` find nothing
pub const EMPTY_DUMP: &str = "No Data Exist";

/// Line prefix for each rendered entry
pub const ENTRY_PREFIX: &str = "------  ";

/// Outcome of a mutation that may target a missing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Ok,
    NotFound,
}

/// State guarded by the store lock
#[derive(Debug, Default)]
struct Inner {
    entries: EntryMap,
    transaction: TransactionBuffer,
}

/// The shared key-value store
///
/// ## Concurrency Model: one coarse lock
///
/// Every method acquires `inner` for its whole duration: lookups,
/// mutations, transaction buffering, the sweep, and rendering. Readers are
/// serialized with writers. No file or network I/O happens under the lock.
///
/// ## Transactions
///
/// The transaction flag and pending buffer belong to the store, not to a
/// caller. While active, `set`/`delete`/`expire` are staged; reads always
/// see committed state.
#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `entries`
    pub fn with_entries(entries: EntryMap) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries,
                transaction: TransactionBuffer::new(),
            }),
        }
    }

    // =========================================================================
    // Key Operations
    // =========================================================================

    /// Upsert a value (clears any TTL), or stage it during a transaction
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let mut inner = self.inner.lock();

        if inner.transaction.is_active() {
            inner.transaction.push(Operation::Set { key, value });
        } else {
            inner.entries.insert(key, Entry::new(value));
        }
    }

    /// Get the committed value for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Remove `key`
    ///
    /// During a transaction the delete is staged and reported `Ok` without
    /// checking whether the key exists.
    pub fn delete(&self, key: &str) -> KeyStatus {
        let mut inner = self.inner.lock();

        if inner.transaction.is_active() {
            inner.transaction.push(Operation::Delete { key: key.to_string() });
            return KeyStatus::Ok;
        }

        match inner.entries.shift_remove(key) {
            Some(_) => KeyStatus::Ok,
            None => KeyStatus::NotFound,
        }
    }

    /// Expire `key` `seconds` from now (negative = already expired)
    ///
    /// During a transaction the expire is staged, reported `Ok`, and its
    /// deadline is computed at commit time.
    pub fn expire(&self, key: &str, seconds: i64) -> Result<KeyStatus> {
        let now = SystemTime::now();
        // Validate range up front so a staged expire cannot fail on commit
        let deadline = deadline_after(now, seconds)?;
        let mut inner = self.inner.lock();

        if inner.transaction.is_active() {
            inner.transaction.push(Operation::Expire {
                key: key.to_string(),
                seconds,
            });
            return Ok(KeyStatus::Ok);
        }

        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(deadline);
                Ok(KeyStatus::Ok)
            }
            None => Ok(KeyStatus::NotFound),
        }
    }

    /// Remaining lifetime of `key`
    pub fn ttl(&self, key: &str) -> Ttl {
        let inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(entry) => entry.ttl_at(SystemTime::now()),
            None => Ttl::Missing,
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Dump every key and entry in key order
    pub fn list(&self) -> String {
        let inner = self.inner.lock();
        render(inner.entries.iter())
    }

    /// Dump every key and entry ordered by value
    ///
    /// Entries with equal values keep key order.
    pub fn sort(&self) -> String {
        let inner = self.inner.lock();
        let mut sorted: Vec<(&String, &Entry)> = inner.entries.iter().collect();
        sorted.sort_by(|a, b| a.1.value.cmp(&b.1.value));
        render(sorted.into_iter())
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Enter transaction mode (idempotent, keeps staged operations)
    pub fn begin(&self) {
        self.inner.lock().transaction.begin();
    }

    /// Apply staged operations in order and leave transaction mode
    ///
    /// Returns the number of operations applied. Safe to call while idle.
    pub fn commit(&self) -> usize {
        let mut inner = self.inner.lock();
        let ops = inner.transaction.take();
        let count = ops.len();
        let now = SystemTime::now();

        for op in ops {
            op.apply(&mut inner.entries, now);
        }

        count
    }

    /// Drop staged operations and leave transaction mode
    ///
    /// Returns the number of operations discarded. Safe to call while idle.
    pub fn rollback(&self) -> usize {
        self.inner.lock().transaction.discard()
    }

    /// Whether a transaction is active
    pub fn in_transaction(&self) -> bool {
        self.inner.lock().transaction.is_active()
    }

    /// Number of staged operations
    pub fn pending_len(&self) -> usize {
        self.inner.lock().transaction.len()
    }

    // =========================================================================
    // Expiration
    // =========================================================================

    /// Evict every entry whose deadline has passed
    ///
    /// Returns the number of evicted keys.
    pub fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        expiry::sweep(&mut inner.entries, SystemTime::now())
    }

    // =========================================================================
    // Snapshot Support
    // =========================================================================

    /// Point-in-time copy of committed entries
    pub fn entries(&self) -> EntryMap {
        self.inner.lock().entries.clone()
    }

    /// Replace committed entries wholesale; transaction state is untouched
    pub fn replace_entries(&self, entries: EntryMap) {
        self.inner.lock().entries = entries;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of committed keys (expired but unswept keys included)
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }
}

/// Render entries as one line each, or the empty sentinel
fn render<'a>(entries: impl Iterator<Item = (&'a String, &'a Entry)>) -> String {
    let mut out = String::from("\n");
    let mut any = false;

    for (key, entry) in entries {
        any = true;
        out.push_str(ENTRY_PREFIX);
        out.push_str(key);
        out.push(' ');
        out.push_str(&entry.to_string());
        out.push('\n');
    }

    if any {
        out
    } else {
        EMPTY_DUMP.to_string()
    }
}
