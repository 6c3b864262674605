//! Protocol Module
//!
//! Defines the text protocol for client-server communication.
//!
//! ## Request Format
//! ```text
//! VERB [arg ...]        (whitespace separated, one request per receive)
//! ```
//!
//! ### Commands
//! - SET key value    → `OK`
//! - GET key          → value, or `None`
//! - DELETE key       → `OK` / `Key not found`
//! - EXPIRE key secs  → `OK` / `Key not found`
//! - TTL key          → remaining seconds, `-1` (no TTL), `-2` (missing)
//! - BEGIN / COMMIT / ROLLBACK
//! - SORT / LIST      → rendered dump
//!
//! ### Error Replies
//! - `INPUT ERROR`     wrong number of arguments
//! - `Invalid command` unknown verb
//! - any other failure replies with its message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{
    Response, Status, REPLY_BEGIN, REPLY_COMMIT, REPLY_NONE, REPLY_NOT_FOUND, REPLY_OK,
    REPLY_ROLLBACK,
};
pub use codec::{
    decode_text, encode_command, parse_command, read_chunk, read_request, write_request,
    write_response,
};
