//! Error types for the snapshot decode engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    // Malformed metadata: detected before any decode begins
    #[error("Malformed {table} metadata: {fields} fields but {types} types")]
    MetaLengthMismatch {
        table: &'static str,
        fields: usize,
        types: usize,
    },

    // Decode errors: abort the current pass, no partial record is emitted
    #[error("String index {index} out of range (string table has {len} entries)")]
    StringIndexOutOfRange { index: u64, len: usize },

    #[error("Enum index {index} out of range ({len} values)")]
    EnumIndexOutOfRange { index: u64, len: usize },

    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(String),

    #[error("Field '{0}' not present in schema")]
    MissingField(String),

    #[error("edge_count of node {node} is not numeric")]
    NonNumericEdgeCount { node: usize },

    #[error("Edge reference {offset} is not a valid node base offset")]
    BadNodeRef { offset: u64 },

    // Structural consistency: the flat arrays disagree with the metadata
    #[error("Flat node array has {actual} slots, expected {count} records x {width} fields")]
    NodeArrayLength {
        count: usize,
        width: usize,
        actual: usize,
    },

    #[error(
        "Inconsistent edge count: node edge_count values sum to {declared} edges \
         ({width} slots each) but flat edge array has {actual} slots"
    )]
    InconsistentEdgeCount {
        declared: u64,
        width: usize,
        actual: usize,
    },

    #[error("Snapshot declares {declared} edges but node edge_count values sum to {actual}")]
    EdgeTotalMismatch { declared: u64, actual: u64 },

    // Collaborator errors: propagated unchanged, never retried
    #[error("Destination table '{table}' has columns {found:?}, dump schema requires {expected:?}")]
    ColumnMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
