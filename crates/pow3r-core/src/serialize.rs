//! Snapshot support for the power graph.
//!
//! Provides binary serialization via `bitcode` with a versioned header, and
//! JSON export/import behind the `json` feature for hand-edited save files.
//! Per-tick scratch fields are not persisted; a restored graph is ready for
//! the next tick.

use crate::state::PowerState;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a Pow3r graph snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x9083_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[cfg(feature = "json")]
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[cfg(feature = "json")]
    #[error("json decoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header stored with every snapshot. Checked before the graph is handed
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Simulation tick at which the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    header: SnapshotHeader,
    state: PowerState,
}

// ---------------------------------------------------------------------------
// Binary snapshots
// ---------------------------------------------------------------------------

/// Serialize the graph to a binary blob tagged with `tick`.
pub fn serialize_state(state: &PowerState, tick: u64) -> Result<Vec<u8>, SerializeError> {
    let snapshot = Snapshot {
        header: SnapshotHeader::new(tick),
        state: state.clone(),
    };
    bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Deserialize a graph from a binary blob, returning it with the tick it
/// was taken at. Returns an error (not a panic) on corrupt data or a
/// version mismatch.
pub fn deserialize_state(data: &[u8]) -> Result<(PowerState, u64), DeserializeError> {
    // bitcode has no partial decoding, so the header is checked after the
    // whole snapshot decodes.
    let snapshot: Snapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok((snapshot.state, snapshot.header.tick))
}

/// Read only the header of a snapshot.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: Snapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Export the graph as pretty-printed JSON.
#[cfg(feature = "json")]
pub fn to_json(state: &PowerState) -> Result<String, SerializeError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Import a graph from JSON produced by [`to_json`].
#[cfg(feature = "json")]
pub fn from_json(json: &str) -> Result<PowerState, DeserializeError> {
    Ok(serde_json::from_str(json)?)
}

// ===========================================================================
// Tests
// ===========================================================================
