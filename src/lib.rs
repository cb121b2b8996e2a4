//! heapdb — decode heap snapshot dumps into relational tables.
//!
//! A heap snapshot encodes a memory graph as flat integer arrays plus
//! self-describing metadata: field names and types are data carried by
//! the dump, not fixed structure. This crate resolves that metadata into
//! a typed schema, reconstructs node and edge records by offset
//! arithmetic, resolves edge targets back to node identities, and hands
//! both relations to a bulk persistence sink (SQLite by default).

pub mod convert;
pub mod decode;
pub mod dump;
pub mod error;
pub mod schema;
pub mod sink;
pub mod table;

pub use convert::{convert, ConvertStats, EDGE_TABLE, NODE_TABLE};
pub use decode::{FieldDecoder, ResolverTable, Value};
pub use dump::{DumpMeta, HeapDump, RawType, SnapshotInfo};
pub use error::{Result, SnapshotError};
pub use schema::{FieldSchema, FieldType, ResolvedSchema};
pub use sink::{BulkSink, SqliteSink};
pub use table::{EdgeTable, NodeTable, EDGE_COUNT_FIELD, FROM_NODE_COLUMN, ID_FIELD};
