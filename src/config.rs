//! Configuration for memkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MemKvError, Result};

/// Main configuration for a memkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the snapshot file
    /// Internal structure:
    ///   {data_dir}/
    ///     └── MemStore        (snapshot, name configurable)
    pub data_dir: PathBuf,

    /// File name of the snapshot inside `data_dir`
    pub snapshot_file: String,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Bytes accepted per receive; one receive carries exactly one command
    pub read_buffer_size: usize,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    /// How often the accept loop polls for new connections and shutdown
    pub accept_poll_ms: u64,

    // -------------------------------------------------------------------------
    // Service Hooks
    // -------------------------------------------------------------------------
    /// Run the expiration sweep before every accept
    pub sweep_on_accept: bool,

    /// Save a snapshot after every accepted connection
    pub snapshot_on_accept: bool,

    /// Optional periodic sweep on a server-owned thread
    pub sweep_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            snapshot_file: "MemStore".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1024,
            read_buffer_size: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            accept_poll_ms: 50,
            sweep_on_accept: true,
            snapshot_on_accept: true,
            sweep_interval: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_file.is_empty() {
            return Err(MemKvError::Config("snapshot file name is empty".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(MemKvError::Config("read buffer size must be positive".to_string()));
        }
        if self.max_connections == 0 {
            return Err(MemKvError::Config("max connections must be positive".to_string()));
        }
        if matches!(self.sweep_interval, Some(d) if d.is_zero()) {
            return Err(MemKvError::Config("sweep interval must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (where the snapshot lives)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the snapshot file name
    pub fn snapshot_file(mut self, name: impl Into<String>) -> Self {
        self.config.snapshot_file = name.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the per-receive buffer size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the accept poll interval (in milliseconds)
    pub fn accept_poll_ms(mut self, ms: u64) -> Self {
        self.config.accept_poll_ms = ms;
        self
    }

    /// Enable or disable the sweep before each accept
    pub fn sweep_on_accept(mut self, enabled: bool) -> Self {
        self.config.sweep_on_accept = enabled;
        self
    }

    /// Enable or disable the snapshot after each accept
    pub fn snapshot_on_accept(mut self, enabled: bool) -> Self {
        self.config.snapshot_on_accept = enabled;
        self
    }

    /// Set the periodic sweep interval (None disables it)
    pub fn sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
