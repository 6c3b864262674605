//! Engine Module
//!
//! Ties the store, its snapshot file, and command dispatch together.
//!
//! ## Responsibilities
//! - Create the data directory and load the snapshot on startup
//! - Execute parsed commands against the store
//! - Turn every request failure into reply text at the request boundary
//! - Expose the sweep and snapshot primitives the server loop drives

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{
    parse_command, Command, Response, REPLY_BEGIN, REPLY_COMMIT, REPLY_NONE, REPLY_OK,
    REPLY_ROLLBACK,
};
use crate::snapshot::{Snapshot, SnapshotInfo};
use crate::store::{KeyStatus, Store};

/// The store engine shared by all connections
///
/// The engine never sweeps or snapshots on its own; `sweep` and
/// `save_snapshot` are called by whoever drives it (normally the server's
/// accept hook).
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The key-value store (one coarse lock inside)
    store: Store,

    /// Snapshot file for `store`
    snapshot: Snapshot,
}

impl Engine {
    /// Open an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Load the snapshot if the file exists
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Load snapshot (missing file means empty store)
        let store = Store::new();
        let snapshot = Snapshot::new(config.snapshot_path());
        snapshot.load(&store)?;

        Ok(Self {
            config,
            store,
            snapshot,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Parse and execute one raw request
    ///
    /// Never fails: any error becomes its reply text.
    pub fn handle_request(&self, request: &str) -> Response {
        match parse_command(request).and_then(|command| self.execute(command)) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Request failed");
                Response::from_error(&e)
            }
        }
    }

    /// Execute a command
    ///
    /// Routes commands to the store
    pub fn execute(&self, command: Command) -> Result<Response> {
        let response = match command {
            Command::Set { key, value } => {
                self.store.set(key, value);
                Response::ok(REPLY_OK)
            }
            Command::Get { key } => match self.store.get(&key) {
                // An empty value reads the same as a missing one
                Some(value) if !value.is_empty() => Response::ok(value),
                _ => Response::ok(REPLY_NONE),
            },
            Command::Delete { key } => status_response(self.store.delete(&key)),
            Command::Expire { key, seconds } => status_response(self.store.expire(&key, seconds)?),
            Command::Ttl { key } => Response::ok(self.store.ttl(&key).to_string()),
            Command::Begin => {
                self.store.begin();
                Response::ok(REPLY_BEGIN)
            }
            Command::Commit => {
                let applied = self.store.commit();
                tracing::debug!(applied, "Transaction committed");
                Response::ok(REPLY_COMMIT)
            }
            Command::Rollback => {
                let discarded = self.store.rollback();
                tracing::debug!(discarded, "Transaction rolled back");
                Response::ok(REPLY_ROLLBACK)
            }
            Command::Sort => Response::ok(self.store.sort()),
            Command::List => Response::ok(self.store.list()),
        };

        Ok(response)
    }

    /// Evict expired keys now
    pub fn sweep(&self) -> usize {
        let evicted = self.store.sweep_expired();
        if evicted > 0 {
            tracing::debug!(evicted, "Expired keys swept");
        }
        evicted
    }

    /// Write the current committed state to the snapshot file
    pub fn save_snapshot(&self) -> Result<SnapshotInfo> {
        self.snapshot.save(&self.store)
    }

    /// Replace the store's entries with the snapshot file, if present
    pub fn load_snapshot(&self) -> Result<Option<SnapshotInfo>> {
        self.snapshot.load(&self.store)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get the snapshot file path
    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn status_response(status: KeyStatus) -> Response {
    match status {
        KeyStatus::Ok => Response::ok(REPLY_OK),
        KeyStatus::NotFound => Response::not_found(),
    }
}
