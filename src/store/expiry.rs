//! Expiration helpers
//!
//! Deadline arithmetic and the sweep pass. The store owns no timer; the
//! sweep runs only when a caller asks for it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{MemKvError, Result};

use super::EntryMap;

/// Compute `now + seconds`
///
/// Negative `seconds` give a deadline in the past, clamped at the Unix
/// epoch so it can still be written to a snapshot.
pub fn deadline_after(now: SystemTime, seconds: i64) -> Result<SystemTime> {
    let offset = Duration::from_secs(seconds.unsigned_abs());

    if seconds >= 0 {
        now.checked_add(offset).ok_or_else(|| {
            MemKvError::InvalidArgument(format!("expire time out of range: {}", seconds))
        })
    } else {
        Ok(now
            .checked_sub(offset)
            .filter(|t| *t >= UNIX_EPOCH)
            .unwrap_or(UNIX_EPOCH))
    }
}

/// Remove every entry whose deadline is at or before `now`
///
/// Returns the number of evicted keys.
pub(crate) fn sweep(entries: &mut EntryMap, now: SystemTime) -> usize {
    let before = entries.len();

    entries.retain(|key, entry| {
        if entry.is_expired_at(now) {
            tracing::debug!(key = %key, "Evicting expired key");
            false
        } else {
            true
        }
    });

    before - entries.len()
}
