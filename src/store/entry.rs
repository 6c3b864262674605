//! Stored entries
//!
//! A value plus its optional absolute expiration instant.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single stored value
///
/// `expires_at` is wall-clock time so it stays meaningful after being
/// written to a snapshot and loaded by another process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The stored value, verbatim
    pub value: String,

    /// Absolute deadline; `None` means the entry never expires
    pub expires_at: Option<SystemTime>,
}

impl Entry {
    /// Create an entry with no expiration
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    /// Create an entry that expires at `deadline`
    pub fn with_deadline(value: impl Into<String>, deadline: SystemTime) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(deadline),
        }
    }

    /// True if the deadline is at or before `now`
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }

    /// Remaining lifetime as seen at `now`
    pub fn ttl_at(&self, now: SystemTime) -> Ttl {
        match self.expires_at {
            None => Ttl::Persistent,
            Some(deadline) => {
                // A deadline in the past clamps to zero
                Ttl::Remaining(deadline.duration_since(now).unwrap_or(Duration::ZERO))
            }
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{value: {:?}, expires_at: ", self.value)?;
        match self.expires_at {
            Some(deadline) => {
                let secs = deadline
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0);
                write!(f, "{}}}", secs)
            }
            None => write!(f, "none}}"),
        }
    }
}

/// Result of a TTL query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ttl {
    /// Key does not exist (`-2`)
    Missing,

    /// Key exists without expiration (`-1`)
    Persistent,

    /// Time left before the key becomes eligible for eviction
    Remaining(Duration),
}

impl Ttl {
    /// Numeric form used on the wire
    pub fn as_secs_f64(&self) -> f64 {
        match self {
            Ttl::Missing => -2.0,
            Ttl::Persistent => -1.0,
            Ttl::Remaining(d) => d.as_secs_f64(),
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Missing => write!(f, "-2"),
            Ttl::Persistent => write!(f, "-1"),
            Ttl::Remaining(d) => write!(f, "{}", d.as_secs_f64()),
        }
    }
}
