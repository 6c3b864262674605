//! # memkv
//!
//! A small in-memory key-value store with:
//! - Optional per-key expiration (TTL) with an explicit sweep
//! - A single store-wide buffered transaction (BEGIN/COMMIT/ROLLBACK)
//! - Whole-store snapshots to one file
//! - A raw TCP text protocol, one thread per client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │        (accept hook: sweep before, snapshot after)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │               Protocol parser → Engine                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Store    │◄─────────│  Snapshot   │
//!   │ (one Mutex) │  copy /  │   (file)    │
//!   └─────────────┘  replace └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod snapshot;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemKvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
