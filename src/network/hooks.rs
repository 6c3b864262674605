//! Accept Hooks
//!
//! Callbacks the server runs around each `accept()`. This is where the
//! expiration sweep and the per-connection snapshot live, so the store
//! itself never does background work or disk I/O.

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// Work to run around each accepted connection
///
/// Errors are logged by the server and never stop the accept loop.
pub trait AcceptHook: Send {
    /// Called once before waiting for the next connection
    fn before_accept(&self, _engine: &Engine) -> Result<()> {
        Ok(())
    }

    /// Called after a connection was handed to its worker thread
    fn after_accept(&self, _engine: &Engine) -> Result<()> {
        Ok(())
    }
}

/// Sweep before accept, snapshot after accept
///
/// A quiet server with no new connections neither sweeps nor saves; use
/// `Config::sweep_interval` for time-based eviction.
#[derive(Debug, Clone, Copy)]
pub struct DefaultHooks {
    sweep: bool,
    snapshot: bool,
}

impl DefaultHooks {
    pub fn new(sweep: bool, snapshot: bool) -> Self {
        Self { sweep, snapshot }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sweep_on_accept, config.snapshot_on_accept)
    }
}

impl AcceptHook for DefaultHooks {
    fn before_accept(&self, engine: &Engine) -> Result<()> {
        if self.sweep {
            engine.sweep();
        }
        Ok(())
    }

    fn after_accept(&self, engine: &Engine) -> Result<()> {
        if self.snapshot {
            engine.save_snapshot()?;
        }
        Ok(())
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl AcceptHook for NoHooks {}
