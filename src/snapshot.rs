//! Snapshot Module
//!
//! Whole-store persistence to a single file.
//!
//! ## Responsibilities
//! - Serialize every committed entry (value + absolute deadline)
//! - Overwrite the previous snapshot atomically (temp file + rename)
//! - Detect truncated or corrupted files on load
//! - Treat a missing file as "start empty"
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (22 bytes)                                        │
//! │   Magic: "MKVS" (4) | Version: u16 (2) | Count: u64 (8)  │
//! │   PayloadLen: u64 (8)                                    │
//! ├──────────────────────────────────────────────────────────┤
//! │ Payload (bincode of key → entry map)                     │
//! ├──────────────────────────────────────────────────────────┤
//! │ CRC32 over header + payload: u32 (4)                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Deadlines are stored as absolute wall-clock instants and compared with
//! the loading process's clock as-is.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{MemKvError, Result};
use crate::store::{EntryMap, Store};

/// Magic bytes identifying a memkv snapshot
pub const MAGIC: &[u8; 4] = b"MKVS";

/// Current snapshot format version
pub const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + EntryCount (8) + PayloadLen (8)
pub const HEADER_SIZE: usize = 22;

/// Trailing checksum size
pub const CRC_SIZE: usize = 4;

/// Summary of a written or loaded snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub entry_count: u64,
    pub size_bytes: u64,
}

/// Snapshot file bound to one path
///
/// `save` copies the map under the store lock and writes it after the lock
/// is released. Concurrent saves are serialized by `save_lock`, held from
/// the copy until the rename, so they never share a temp file and a newer
/// copy is never overwritten by an older one.
pub struct Snapshot {
    path: PathBuf,
    save_lock: Mutex<()>,
}

impl Snapshot {
    /// Bind a snapshot to `path` (nothing is touched on disk yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            save_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the store's committed entries, replacing any earlier snapshot
    ///
    /// The copy is taken while holding `save_lock`, so saves land on disk in
    /// the order their copies were taken.
    pub fn save(&self, store: &Store) -> Result<SnapshotInfo> {
        let _guard = self.save_lock.lock();
        let entries = store.entries();
        self.write_locked(&entries)
    }

    /// Replace the store's entries with the snapshot, if one exists
    ///
    /// Returns `Ok(None)` and leaves the store untouched when there is no
    /// snapshot file.
    pub fn load(&self, store: &Store) -> Result<Option<SnapshotInfo>> {
        match self.read_entries()? {
            Some((entries, info)) => {
                store.replace_entries(entries);
                info!(
                    path = %info.path.display(),
                    entries = info.entry_count,
                    "Snapshot loaded"
                );
                Ok(Some(info))
            }
            None => {
                debug!(path = %self.path.display(), "No snapshot to load");
                Ok(None)
            }
        }
    }

    /// Atomically write `entries` to the snapshot path
    pub fn write_entries(&self, entries: &EntryMap) -> Result<SnapshotInfo> {
        let _guard = self.save_lock.lock();
        self.write_locked(entries)
    }

    /// Write `entries`; the caller holds `save_lock`
    fn write_locked(&self, entries: &EntryMap) -> Result<SnapshotInfo> {
        let bytes = encode(entries)?;
        let temp_path = self.temp_path();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if let Err(e) = write_synced(&temp_path, &bytes) {
            warn!(
                temp_path = %temp_path.display(),
                error = %e,
                "Snapshot write failed, cleaning up temp file"
            );
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            warn!(
                temp_path = %temp_path.display(),
                error = %e,
                "Snapshot rename failed, cleaning up temp file"
            );
            let _ = fs::remove_file(&temp_path);
            return Err(MemKvError::Io(e));
        }

        let info = SnapshotInfo {
            path: self.path.clone(),
            entry_count: entries.len() as u64,
            size_bytes: bytes.len() as u64,
        };

        debug!(
            path = %info.path.display(),
            entries = info.entry_count,
            size_bytes = info.size_bytes,
            "Snapshot written"
        );

        Ok(info)
    }

    /// Read and validate the snapshot file
    pub fn read_entries(&self) -> Result<Option<(EntryMap, SnapshotInfo)>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MemKvError::Io(e)),
        };

        let entries = decode(&bytes)?;
        let info = SnapshotInfo {
            path: self.path.clone(),
            entry_count: entries.len() as u64,
            size_bytes: bytes.len() as u64,
        };

        Ok(Some((entries, info)))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Write `bytes` to a fresh file and fsync it
fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

// =============================================================================
// Encoding/Decoding
// =============================================================================

/// Encode entries into the snapshot file format
pub fn encode(entries: &EntryMap) -> Result<Vec<u8>> {
    let payload = bincode::serialize(entries)?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(&payload);

    let crc = crc32fast::hash(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());

    Ok(buf)
}

/// Decode and validate a snapshot file image
pub fn decode(bytes: &[u8]) -> Result<EntryMap> {
    if bytes.len() < HEADER_SIZE + CRC_SIZE {
        return Err(MemKvError::SnapshotCorruption(format!(
            "file too short: {} bytes",
            bytes.len()
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(MemKvError::SnapshotCorruption(format!(
            "invalid magic: expected MKVS, got {:?}",
            &bytes[0..4]
        )));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(MemKvError::SnapshotCorruption(format!(
            "unsupported version: {}",
            version
        )));
    }

    let entry_count = read_u64(&bytes[6..14]);
    let payload_len = read_u64(&bytes[14..22]) as usize;

    let body_len = bytes.len() - CRC_SIZE;
    if HEADER_SIZE.checked_add(payload_len) != Some(body_len) {
        return Err(MemKvError::SnapshotCorruption(format!(
            "payload length mismatch: header says {}, file holds {}",
            payload_len,
            body_len - HEADER_SIZE
        )));
    }

    let expected_crc = u32::from_le_bytes([
        bytes[body_len],
        bytes[body_len + 1],
        bytes[body_len + 2],
        bytes[body_len + 3],
    ]);
    let actual_crc = crc32fast::hash(&bytes[..body_len]);
    if actual_crc != expected_crc {
        return Err(MemKvError::SnapshotCorruption(format!(
            "CRC mismatch: expected {:08x}, got {:08x}",
            expected_crc, actual_crc
        )));
    }

    let entries: EntryMap = bincode::deserialize(&bytes[HEADER_SIZE..body_len])
        .map_err(|e| MemKvError::SnapshotCorruption(format!("deserialization failed: {}", e)))?;

    if entries.len() as u64 != entry_count {
        return Err(MemKvError::SnapshotCorruption(format!(
            "entry count mismatch: header says {}, payload holds {}",
            entry_count,
            entries.len()
        )));
    }

    Ok(entries)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
