//! Protocol codec
//!
//! Parsing and rendering functions for the text protocol.
//!
//! ## Wire Format
//!
//! A request is one whitespace-delimited line, no terminator required:
//! ```text
//! VERB [arg ...]
//! ```
//! The verb is matched case-insensitively; arguments are taken verbatim.
//! One receive of at most `read_buffer_size` bytes is one request.
//!
//! A response is the reply text, written as-is.

use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;

use crate::error::{MemKvError, Result};
use super::{Command, CommandType, Response};

// =============================================================================
// Command Parsing/Encoding
// =============================================================================

/// Parse one request into a command
///
/// Wrong arity yields `MemKvError::Input`; an unknown verb yields
/// `MemKvError::UnknownCommand`. Commands without arguments ignore any
/// extra words.
pub fn parse_command(request: &str) -> Result<Command> {
    let parts: Vec<&str> = request.split_whitespace().collect();

    let (verb, args) = match parts.split_first() {
        Some((verb, args)) => (*verb, args),
        None => return Err(MemKvError::Protocol("empty command".to_string())),
    };

    let ty = CommandType::from_verb(verb).ok_or(MemKvError::UnknownCommand)?;

    if let Some(arity) = ty.arity() {
        if args.len() != arity {
            return Err(MemKvError::Input);
        }
    }

    let command = match ty {
        CommandType::Set => Command::Set {
            key: args[0].to_string(),
            value: args[1].to_string(),
        },
        CommandType::Get => Command::Get {
            key: args[0].to_string(),
        },
        CommandType::Delete => Command::Delete {
            key: args[0].to_string(),
        },
        CommandType::Expire => Command::Expire {
            key: args[0].to_string(),
            seconds: parse_seconds(args[1])?,
        },
        CommandType::Ttl => Command::Ttl {
            key: args[0].to_string(),
        },
        CommandType::Begin => Command::Begin,
        CommandType::Commit => Command::Commit,
        CommandType::Rollback => Command::Rollback,
        CommandType::Sort => Command::Sort,
        CommandType::List => Command::List,
    };

    Ok(command)
}

fn parse_seconds(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        MemKvError::InvalidArgument(format!("expire seconds must be an integer, got '{}'", raw))
    })
}

/// Render a command as a request line
pub fn encode_command(command: &Command) -> String {
    let verb = command.command_type().verb();
    match command {
        Command::Set { key, value } => format!("{} {} {}", verb, key, value),
        Command::Expire { key, seconds } => format!("{} {} {}", verb, key, seconds),
        Command::Get { key } | Command::Delete { key } | Command::Ttl { key } => {
            format!("{} {}", verb, key)
        }
        Command::Begin
        | Command::Commit
        | Command::Rollback
        | Command::Sort
        | Command::List => verb.to_string(),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one request with a single receive
///
/// At most `max_len` bytes are accepted; `buf` is reused across calls.
/// Returns `Ok(None)` when the peer closed the connection.
pub fn read_request<R: Read>(
    reader: &mut R,
    buf: &mut BytesMut,
    max_len: usize,
) -> Result<Option<String>> {
    buf.clear();
    if read_chunk(reader, buf, max_len)? == 0 {
        return Ok(None);
    }
    decode_text(&buf[..]).map(Some)
}

/// Write one response and flush
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(response.as_str().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write one request line and flush
pub fn write_request<W: Write>(writer: &mut W, request: &str) -> Result<()> {
    writer.write_all(request.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Append one receive of at most `max_len` bytes to `buf`
///
/// Returns the number of bytes read; 0 means the peer closed the
/// connection. On error `buf` is left as it was.
pub fn read_chunk<R: Read>(reader: &mut R, buf: &mut BytesMut, max_len: usize) -> Result<usize> {
    let start = buf.len();
    buf.resize(start + max_len, 0);

    let n = loop {
        match reader.read(&mut buf[start..]) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                buf.truncate(start);
                return Err(MemKvError::Io(e));
            }
        }
    };

    buf.truncate(start + n);
    Ok(n)
}

/// Decode received bytes as UTF-8 text
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => Err(MemKvError::Protocol(format!("payload is not valid UTF-8: {}", e))),
    }
}
