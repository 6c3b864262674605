//! Error types for memkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MemKvError
pub type Result<T> = std::result::Result<T, MemKvError>;

/// Unified error type for memkv operations
///
/// A missing key is not an error: lookups return `Option` and mutations
/// report [`KeyStatus::NotFound`](crate::store::KeyStatus::NotFound).
#[derive(Debug, Error)]
pub enum MemKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    /// Wrong number of arguments for a known command
    #[error("INPUT ERROR")]
    Input,

    /// Verb not recognized
    #[error("Invalid command")]
    UnknownCommand,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for MemKvError {
    fn from(e: bincode::Error) -> Self {
        MemKvError::Serialization(e.to_string())
    }
}
