//! Connection Handler
//!
//! Handles individual client connections.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{MemKvError, Result};
use crate::engine::Engine;
use crate::protocol::{read_request, write_response, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream (unbuffered: one receive is one request)
    stream: TcpStream,

    /// Reusable receive buffer
    buf: BytesMut,

    /// Bytes accepted per receive
    max_request: usize,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        // Get peer address for logging
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let max_request = engine.config().read_buffer_size;

        Ok(Self {
            stream,
            buf: BytesMut::with_capacity(max_request),
            max_request,
            engine,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 = none)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads one request per receive and sends one reply for each.
    /// Returns when the client disconnects or an I/O error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.stream, &mut self.buf, self.max_request) {
                Ok(Some(request)) => request,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(MemKvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(MemKvError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e @ MemKvError::Protocol(_)) => {
                    // Undecodable payload: reply and keep the connection
                    tracing::warn!("Bad request from {}: {}", self.peer_addr, e);
                    if !self.reply(Response::from_error(&e))? {
                        return Ok(());
                    }
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            let response = self.engine.handle_request(&request);
            if !self.reply(response)? {
                return Ok(());
            }
        }
    }

    /// Send a response
    ///
    /// Returns `Ok(false)` if the client vanished before the write.
    fn reply(&mut self, response: Response) -> Result<bool> {
        match write_response(&mut self.stream, &response) {
            Ok(()) => Ok(true),
            Err(MemKvError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
