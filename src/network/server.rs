//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.
//!
//! Loop shape, per connection:
//! ```text
//! hook.before_accept → accept → spawn worker → hook.after_accept
//! ```

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{MemKvError, Result};

use super::connection::Connection;
use super::hooks::{AcceptHook, DefaultHooks};

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop; live connections finish on their own
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for memkv
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    hook: Box<dyn AcceptHook>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    ///
    /// Installs `DefaultHooks` built from the config.
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        let hook = Box::new(DefaultHooks::from_config(&config));
        Self {
            config,
            engine,
            hook,
            listener: None,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the accept hook
    pub fn with_hook(mut self, hook: Box<dyn AcceptHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Bind the listener (idempotent) and return the bound address
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr)?;
        // Polled so shutdown is noticed while waiting for clients
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);

        tracing::info!("Listening on {}", addr);
        Ok(addr)
    }

    /// Handle used to stop `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        self.bind()?;
        let listener = self
            .listener
            .take()
            .ok_or_else(|| MemKvError::Network("listener not bound".to_string()))?;

        let sweeper = self
            .config
            .sweep_interval
            .map(|interval| Sweeper::spawn(Arc::clone(&self.engine), interval))
            .transpose()?;

        let poll = Duration::from_millis(self.config.accept_poll_ms.max(1));

        while !self.shutdown.is_shutdown() {
            if let Err(e) = self.hook.before_accept(&self.engine) {
                tracing::warn!("before_accept hook failed: {}", e);
            }

            let (stream, peer) = match self.wait_for_client(&listener, poll) {
                Some(accepted) => accepted,
                None => break,
            };

            tracing::info!("Accepted connection from {}", peer);
            self.spawn_worker(stream, peer);

            if let Err(e) = self.hook.after_accept(&self.engine) {
                tracing::warn!("after_accept hook failed: {}", e);
            }
        }

        if let Some(sweeper) = sweeper {
            sweeper.stop();
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Poll the listener until a client arrives or shutdown is requested
    fn wait_for_client(&self, listener: &TcpListener, poll: Duration) -> Option<(TcpStream, SocketAddr)> {
        loop {
            if self.shutdown.is_shutdown() {
                return None;
            }

            match listener.accept() {
                Ok(accepted) => return Some(accepted),
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(poll);
                }
            }
        }
    }

    /// Run one connection on its own thread
    fn spawn_worker(&self, stream: TcpStream, peer: SocketAddr) {
        let live = self.active_connections.fetch_add(1, Ordering::SeqCst);
        if live >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                "Rejecting {}: {} connections already open",
                peer,
                self.config.max_connections
            );
            return;
        }

        let engine = Arc::clone(&self.engine);
        let active = Arc::clone(&self.active_connections);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("memkv-conn-{}", peer))
            .spawn(move || {
                let result = serve(stream, engine, read_ms, write_ms);
                active.fetch_sub(1, Ordering::SeqCst);
                if let Err(e) = result {
                    tracing::warn!("Connection {} ended with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            self.active_connections.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("Failed to spawn worker for {}: {}", peer, e);
        }
    }
}

fn serve(stream: TcpStream, engine: Arc<Engine>, read_ms: u64, write_ms: u64) -> Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode
    stream.set_nonblocking(false)?;
    let mut connection = Connection::new(stream, engine)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}

/// Periodic sweep thread owned by the server
struct Sweeper {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    fn spawn(engine: Arc<Engine>, interval: Duration) -> Result<Self> {
        let (stop, stopped) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("memkv-sweeper".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        engine.sweep();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::debug!(?interval, "Periodic sweeper started");
        Ok(Self { stop, handle })
    }

    fn stop(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            tracing::warn!("Sweeper thread panicked");
        }
    }
}
