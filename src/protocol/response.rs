//! Response definitions
//!
//! Represents replies to clients. Every reply is plain text with no
//! terminator; the status is only used server-side.

use std::fmt;

use crate::error::MemKvError;

/// Reply to a successful mutation
pub const REPLY_OK: &str = "OK";

/// Reply to DELETE/EXPIRE of a missing key
pub const REPLY_NOT_FOUND: &str = "Key not found";

/// Reply to GET of a missing (or empty) value
pub const REPLY_NONE: &str = "None";

pub const REPLY_BEGIN: &str = "Transaction started";
pub const REPLY_COMMIT: &str = "Transaction committed";
pub const REPLY_ROLLBACK: &str = "Transaction rolled back";

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Reply text sent verbatim
    pub body: String,
}

impl Response {
    /// Create an OK response
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            body: REPLY_NOT_FOUND.to_string(),
        }
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            body: message.into(),
        }
    }

    /// Map any error to the text the client sees
    ///
    /// `Input` and `UnknownCommand` render as the fixed protocol strings;
    /// everything else replies with its message.
    pub fn from_error(err: &MemKvError) -> Self {
        Self::error(err.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}
