use super::definition::FunnelFlow;
use super::meta::FunnelMeta;
use crate::error::SnapshotError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// A persisted funnel: the graph plus its deployment metadata. This is the
/// round-trip format the persistence collaborator stores between editing
/// sessions.
#[derive(Serialize, Deserialize, Debug)]
pub struct FlowSnapshot {
    pub flow: FunnelFlow,
    pub meta: FunnelMeta,
}

impl FlowSnapshot {
    pub fn new(flow: FunnelFlow, meta: FunnelMeta) -> Self {
        Self { flow, meta }
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let bytes = encode_to_vec(self, standard())
            .map_err(|e| SnapshotError::Generic(format!("Serialization failed: {}", e)))?;
        let mut file = fs::File::create(path).map_err(|e| {
            SnapshotError::Generic(format!("Could not create file '{}': {}", path, e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            SnapshotError::Generic(format!("Could not write to file '{}': {}", path, e))
        })?;
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let mut file = fs::File::open(path)
            .map_err(|e| SnapshotError::Generic(format!("Could not open file '{}': {}", path, e)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            SnapshotError::Generic(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a snapshot from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| SnapshotError::Generic(format!("Deserialization failed: {}", e)))
    }
}
