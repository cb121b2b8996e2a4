//! Raw dump document model and file read.
//!
//! A heap snapshot is a single JSON document. The interesting parts are
//! flat integer arrays (`nodes`, `edges`) whose structure is described by
//! the metadata block they travel with — field names and types are data,
//! not fixed structure. This module only materializes the document; all
//! interpretation happens in `schema` and `table`.
//!
//! ```text
//! snapshot.meta.node_fields   ordered node field names
//! snapshot.meta.node_types    per-field type descriptors
//! snapshot.meta.edge_fields   ordered edge field names
//! snapshot.meta.edge_types    per-field type descriptors
//! snapshot.node_count         number of node records
//! nodes                       flat array, node_fields.len() slots per record
//! edges                       flat array, edge_fields.len() slots per record
//! strings                     index-addressed string table
//! ```

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::Deserialize;

use crate::error::Result;

/// A field type as written in the dump metadata: either the name of a
/// scalar type or an ordered enumeration of possible string values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawType {
    Name(String),
    Enum(Vec<String>),
}

/// The dump's embedded metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct DumpMeta {
    pub node_fields: Vec<String>,
    pub node_types: Vec<RawType>,
    pub edge_fields: Vec<String>,
    pub edge_types: Vec<RawType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotInfo {
    pub meta: DumpMeta,
    pub node_count: usize,
    /// Total edge count. Optional in the input; cross-checked against the
    /// per-node edge_count sum when present.
    #[serde(default)]
    pub edge_count: Option<u64>,
}

/// A fully materialized heap snapshot dump.
///
/// The whole document (string table included) stays in memory for the
/// duration of both decode passes; nothing here is mutated after parse.
#[derive(Debug, Clone, Deserialize)]
pub struct HeapDump {
    pub snapshot: SnapshotInfo,
    pub nodes: Vec<u64>,
    pub edges: Vec<u64>,
    pub strings: Vec<String>,
}

impl HeapDump {
    /// Read and parse a dump file (memory-mapped).
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }?;
        Self::from_slice(&mmap)
    }

    /// Parse a dump from a byte slice (for testing / embedding).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
