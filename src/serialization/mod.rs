//! Postcard-based snapshot serialization with versioned envelopes.
//!
//! [`InMemoryStore`](crate::backend::InMemoryStore) can persist its tables to
//! a snapshot file after every committed transaction. The file format is:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "SKIT"              u32                postcard::to_allocvec(T)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sales_kit::repository::Tables;
//! use sales_kit::serialization::{decode_snapshot, encode_snapshot};
//!
//! # fn main() -> sales_kit::Result<()> {
//! let tables = Tables::default();
//! let bytes = encode_snapshot(&tables)?;
//! assert_eq!(&bytes[0..4], b"SKIT");
//!
//! let restored: Tables = decode_snapshot(&bytes)?;
//! assert!(restored.customers.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Magic header of sales-kit snapshot files: b"SKIT"
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"SKIT";

/// Current snapshot schema version.
///
/// Bump when a stored record type changes shape (fields added, removed,
/// reordered or retyped). Older snapshots are then rejected with
/// `Error::VersionMismatch` instead of being misread.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope wrapped around every snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEnvelope<T> {
    /// Magic header: must be b"SKIT"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    pub payload: T,
}

impl<T> SnapshotEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Serialize a value into an enveloped snapshot.
///
/// # Errors
///
/// Returns `Error::Serialization` if Postcard serialization fails.
pub fn encode_snapshot<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = SnapshotEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Snapshot serialization failed: {}", e);
        Error::Serialization(e.to_string())
    })
}

/// Decode an enveloped snapshot, validating magic and version first.
///
/// The header is checked before the payload is touched, so a file from a
/// different schema version reports `VersionMismatch` rather than a decode
/// error.
///
/// # Errors
///
/// - `Error::InvalidSnapshot`: missing or wrong magic header
/// - `Error::VersionMismatch`: schema version mismatch
/// - `Error::Deserialization`: corrupted Postcard payload
pub fn decode_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let header = bytes.get(0..4).ok_or_else(|| {
        Error::InvalidSnapshot(format!("snapshot too short: {} bytes", bytes.len()))
    })?;

    if header != SNAPSHOT_MAGIC {
        log::warn!(
            "Invalid snapshot: expected magic {:?}, got {:?}",
            SNAPSHOT_MAGIC,
            header
        );
        return Err(Error::InvalidSnapshot(format!(
            "Invalid magic: expected {:?}, got {:?}",
            SNAPSHOT_MAGIC, header
        )));
    }

    let (version, _) = postcard::take_from_bytes::<u32>(&bytes[4..]).map_err(|e| {
        log::error!("Snapshot header could not be read: {}", e);
        Error::Deserialization(e.to_string())
    })?;

    if version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Snapshot version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    let envelope: SnapshotEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        log::error!("Snapshot deserialization failed: {}", e);
        Error::Deserialization(e.to_string())
    })?;

    Ok(envelope.payload)
}
