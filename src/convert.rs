//! One-way decode pipeline: dump → schema → tables → sink.

use crate::dump::HeapDump;
use crate::error::Result;
use crate::schema::ResolvedSchema;
use crate::sink::BulkSink;
use crate::table::{EdgeTable, NodeTable, ID_FIELD};

/// Destination relation names.
pub const NODE_TABLE: &str = "node";
pub const EDGE_TABLE: &str = "edge";

/// Counts reported after a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub nodes: usize,
    pub edges: usize,
}

/// Decode `dump` and persist both relations through `sink`.
///
/// Two sequential whole-dataset passes; each relation is handed to the
/// sink as one fully buffered batch, nodes first. Any error aborts the
/// run before the failing batch commits — a partial table is never valid.
pub fn convert(dump: &HeapDump, sink: &mut dyn BulkSink) -> Result<ConvertStats> {
    let schema = ResolvedSchema::resolve(&dump.snapshot.meta)?;

    tracing::info!("decoding {} nodes", dump.snapshot.node_count);
    let nodes = NodeTable::build(dump, &schema)?;

    tracing::info!("decoding edges");
    let edges = EdgeTable::build(dump, &schema, &nodes)?;

    // Both destination column lists derive from the resolved schema, once.
    sink.prepare(NODE_TABLE, &nodes.columns, &schema.node.types, Some(ID_FIELD))?;

    let id_pos = schema.node.position(ID_FIELD)?;
    let mut edge_types = Vec::with_capacity(edges.columns.len());
    edge_types.push(schema.node.types[id_pos].clone());
    edge_types.extend(schema.edge.types.iter().cloned());
    sink.prepare(EDGE_TABLE, &edges.columns, &edge_types, None)?;

    tracing::info!("inserting {} node rows", nodes.len());
    sink.insert(NODE_TABLE, &nodes.columns, &nodes.rows)?;

    tracing::info!("inserting {} edge rows", edges.len());
    sink.insert(EDGE_TABLE, &edges.columns, &edges.rows)?;

    Ok(ConvertStats {
        nodes: nodes.len(),
        edges: edges.len(),
    })
}
