//! TCP Client
//!
//! Minimal blocking client: one request, one reply.
//!
//! Replies carry no terminator. A first receive of at least
//! `CONTINUATION_THRESHOLD` bytes is treated as a possibly unfinished dump
//! and read on until the server goes quiet for `CONTINUATION_WAIT`. Bytes still pending from an earlier reply are
//! discarded before the next request is sent, so a late tail is never
//! mistaken for the next answer.

use std::io::{ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{MemKvError, Result};
use crate::protocol::{decode_text, encode_command, read_chunk, write_request, Command};

/// Bytes requested per receive
pub const REPLY_BUFFER_SIZE: usize = 64 * 1024;

/// First receives this large may be followed by more of the same reply
pub const CONTINUATION_THRESHOLD: usize = 16 * 1024;

/// How long to wait for more of a large reply
pub const CONTINUATION_WAIT: Duration = Duration::from_millis(50);

/// A connection to a memkv server
pub struct Client {
    stream: TcpStream,
    buf: BytesMut,
    timeout: Option<Duration>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            buf: BytesMut::with_capacity(REPLY_BUFFER_SIZE),
            timeout: None,
        })
    }

    /// Set the reply timeout (None blocks forever)
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        self.timeout = timeout;
        Ok(())
    }

    /// Send a raw request line and wait for its reply
    pub fn request(&mut self, line: &str) -> Result<String> {
        if line.trim().is_empty() {
            return Err(MemKvError::Protocol("empty command".to_string()));
        }

        self.discard_stale()?;
        write_request(&mut self.stream, line)?;
        self.read_reply()
    }

    /// Send a typed command and wait for its reply
    pub fn execute(&mut self, command: &Command) -> Result<String> {
        self.request(&encode_command(command))
    }

    /// Read one reply, following large ones across receives
    fn read_reply(&mut self) -> Result<String> {
        self.buf.clear();

        let first = read_chunk(&mut self.stream, &mut self.buf, REPLY_BUFFER_SIZE)?;
        if first == 0 {
            return Err(MemKvError::Network("connection closed by server".to_string()));
        }

        if first >= CONTINUATION_THRESHOLD {
            self.stream.set_read_timeout(Some(CONTINUATION_WAIT))?;
            let more = self.read_continuation();
            self.stream.set_read_timeout(self.timeout)?;
            more?;
        }

        decode_text(&self.buf[..])
    }

    fn read_continuation(&mut self) -> Result<()> {
        loop {
            match read_chunk(&mut self.stream, &mut self.buf, REPLY_BUFFER_SIZE) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(MemKvError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop any bytes left over from an earlier reply
    fn discard_stale(&mut self) -> Result<()> {
        self.stream.set_nonblocking(true)?;

        let mut scratch = [0u8; 4096];
        let drained = loop {
            match self.stream.read(&mut scratch) {
                // Closed; the next write or read reports it
                Ok(0) => break Ok(()),
                Ok(n) => tracing::debug!(bytes = n, "Discarded stale reply bytes"),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => break Err(MemKvError::Io(e)),
            }
        };

        self.stream.set_nonblocking(false)?;
        drained
    }
}
