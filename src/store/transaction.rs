//! Transaction buffer
//!
//! Mutations deferred while a transaction is active, replayed in order on
//! commit.

use std::time::SystemTime;

use super::expiry::deadline_after;
use super::{Entry, EntryMap};

/// A mutation staged during an active transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Upsert a value, clearing any TTL
    Set { key: String, value: String },

    /// Remove a key if present
    Delete { key: String },

    /// Set a deadline `seconds` after commit time
    Expire { key: String, seconds: i64 },
}

impl Operation {
    /// The key this operation touches
    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. } => key,
            Operation::Delete { key } => key,
            Operation::Expire { key, .. } => key,
        }
    }

    /// Apply to committed state
    ///
    /// Deletes and expires of keys missing at commit time are skipped.
    pub(crate) fn apply(self, entries: &mut EntryMap, now: SystemTime) {
        match self {
            Operation::Set { key, value } => {
                entries.insert(key, Entry::new(value));
            }
            Operation::Delete { key } => {
                entries.shift_remove(&key);
            }
            Operation::Expire { key, seconds } => {
                if let Some(entry) = entries.get_mut(&key) {
                    match deadline_after(now, seconds) {
                        Ok(deadline) => entry.expires_at = Some(deadline),
                        Err(e) => tracing::warn!(key = %key, error = %e, "Skipping staged expire"),
                    }
                }
            }
        }
    }
}

/// Store-wide transaction state
///
/// There is exactly one buffer per store, shared by every caller: any
/// client may stage into, commit, or roll back a transaction another
/// client began.
#[derive(Debug, Default)]
pub struct TransactionBuffer {
    active: bool,
    pending: Vec<Operation>,
}

impl TransactionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enter transaction mode; pending operations are kept if already active
    pub fn begin(&mut self) {
        self.active = true;
    }

    /// Stage an operation
    pub fn push(&mut self, op: Operation) {
        self.pending.push(op);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Leave transaction mode and hand back the staged operations
    pub fn take(&mut self) -> Vec<Operation> {
        self.active = false;
        std::mem::take(&mut self.pending)
    }

    /// Leave transaction mode, dropping staged operations
    ///
    /// Returns how many were discarded.
    pub fn discard(&mut self) -> usize {
        self.take().len()
    }
}
