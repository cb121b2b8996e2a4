//! Node and edge table reconstruction from the flat arrays.
//!
//! Two sequential whole-dataset passes. Nodes first: fixed-width records,
//! base offset `i * width`. Edges second: the flat edge array carries no
//! per-node offset table — node `i` owns the next `edge_count(i)` edges at
//! a running cursor, so edge decode depends on node decode having already
//! established every node's identity and edge count.

use crate::decode::{FieldDecoder, ResolverTable, Value};
use crate::dump::HeapDump;
use crate::error::{Result, SnapshotError};
use crate::schema::ResolvedSchema;

/// Node field names the builders must be able to locate. Their positions
/// are schema-driven, never assumed.
pub const ID_FIELD: &str = "id";
pub const EDGE_COUNT_FIELD: &str = "edge_count";

/// Column prepended to edge rows for the owning node's identity. Not part
/// of the raw edge encoding — supplied by the builder.
pub const FROM_NODE_COLUMN: &str = "from_node";

// ── Node Table ─────────────────────────────────────────────────────

/// Decoded node relation: one row per node, columns in `node_fields` order.
#[derive(Debug)]
pub struct NodeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    id_pos: usize,
    edge_count_pos: usize,
}

impl NodeTable {
    /// Decode every node record from the flat node array, in index order.
    pub fn build(dump: &HeapDump, schema: &ResolvedSchema) -> Result<Self> {
        let node = &schema.node;
        let width = node.width();
        let count = dump.snapshot.node_count;

        // Positions of the identity and edge-count fields, looked up once.
        let id_pos = node.position(ID_FIELD)?;
        let edge_count_pos = node.position(EDGE_COUNT_FIELD)?;

        // The declared record count and the flat array must agree exactly.
        if count.checked_mul(width) != Some(dump.nodes.len()) {
            return Err(SnapshotError::NodeArrayLength {
                count,
                width,
                actual: dump.nodes.len(),
            });
        }

        // Node fields never reference the edge array: no resolvers.
        let decoder = FieldDecoder::new(&dump.strings, ResolverTable::new());

        let mut rows = Vec::with_capacity(count);
        for i in 0..count {
            let base = i * width;
            let mut row = Vec::with_capacity(width);
            for (pos, field_type) in node.types.iter().enumerate() {
                row.push(decoder.decode(dump.nodes[base + pos], field_type)?);
            }
            rows.push(row);
        }

        Ok(Self {
            columns: node.fields.clone(),
            rows,
            id_pos,
            edge_count_pos,
        })
    }

    /// Decoded identity of node `index`.
    pub fn id(&self, index: usize) -> &Value {
        &self.rows[index][self.id_pos]
    }

    /// Decoded edge count of node `index`.
    pub fn edge_count(&self, index: usize) -> Result<u64> {
        self.rows[index][self.edge_count_pos]
            .as_int()
            .ok_or(SnapshotError::NonNumericEdgeCount { node: index })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Edge Table ─────────────────────────────────────────────────────

/// Decoded edge relation: `from_node` plus `edge_fields`, rows in
/// owning-node order, within a node in edge-array order.
#[derive(Debug)]
pub struct EdgeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl EdgeTable {
    /// Decode every edge record in owning-node order.
    ///
    /// A `Reference("node")` value is an absolute offset into the flat
    /// node array (already record-aligned, no multiplication); the target
    /// identity comes from the node table decoded in the first pass.
    pub fn build(dump: &HeapDump, schema: &ResolvedSchema, nodes: &NodeTable) -> Result<Self> {
        let edge = &schema.edge;
        let width = edge.width();
        let node_width = schema.node.width();

        // Sum the per-node spans up front: a length mismatch must produce
        // zero edge rows, not a truncated set.
        let mut declared: u64 = 0;
        for i in 0..nodes.len() {
            // A saturated sum can never match the array length below.
            declared = declared.saturating_add(nodes.edge_count(i)?);
        }
        if let Some(total) = dump.snapshot.edge_count {
            if total != declared {
                return Err(SnapshotError::EdgeTotalMismatch {
                    declared: total,
                    actual: declared,
                });
            }
        }
        if declared.checked_mul(width as u64) != Some(dump.edges.len() as u64) {
            return Err(SnapshotError::InconsistentEdgeCount {
                declared,
                width,
                actual: dump.edges.len(),
            });
        }

        let mut resolvers = ResolverTable::new();
        resolvers.register("node", |offset: u64| {
            let slot = offset as usize;
            if node_width == 0 || slot % node_width != 0 || slot / node_width >= nodes.len() {
                return Err(SnapshotError::BadNodeRef { offset });
            }
            Ok(nodes.id(slot / node_width).clone())
        });
        let decoder = FieldDecoder::new(&dump.strings, resolvers);

        let mut columns = Vec::with_capacity(width + 1);
        columns.push(FROM_NODE_COLUMN.to_string());
        columns.extend(edge.fields.iter().cloned());

        let mut rows = Vec::with_capacity(declared as usize);
        let mut cursor = 0usize;
        for i in 0..nodes.len() {
            let owner = nodes.id(i).clone();
            for _ in 0..nodes.edge_count(i)? {
                if cursor + width > dump.edges.len() {
                    return Err(SnapshotError::InconsistentEdgeCount {
                        declared,
                        width,
                        actual: dump.edges.len(),
                    });
                }
                let mut row = Vec::with_capacity(width + 1);
                row.push(owner.clone());
                for (pos, field_type) in edge.types.iter().enumerate() {
                    row.push(decoder.decode(dump.edges[cursor + pos], field_type)?);
                }
                rows.push(row);
                cursor += width;
            }
        }

        // The spans must exhaust the array exactly.
        if cursor != dump.edges.len() {
            return Err(SnapshotError::InconsistentEdgeCount {
                declared,
                width,
                actual: dump.edges.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::{DumpMeta, RawType, SnapshotInfo};

    // Schema used throughout: nodes (type, name, id, self_size, edge_count),
    // edges (type, name_or_index, to_node).
    fn sample_meta() -> DumpMeta {
        DumpMeta {
            node_fields: ["type", "name", "id", "self_size", "edge_count"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            node_types: vec![
                RawType::Enum(vec!["hidden".into(), "object".into()]),
                RawType::Name("string".into()),
                RawType::Name("number".into()),
                RawType::Name("number".into()),
                RawType::Name("number".into()),
            ],
            edge_fields: ["type", "name_or_index", "to_node"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            edge_types: vec![
                RawType::Enum(vec!["context".into(), "element".into(), "property".into()]),
                RawType::Name("string_or_number".into()),
                RawType::Name("node".into()),
            ],
        }
    }

    fn sample_dump() -> HeapDump {
        HeapDump {
            snapshot: SnapshotInfo {
                meta: sample_meta(),
                node_count: 2,
                edge_count: Some(1),
            },
            // node 0: object "root" id=10 size=24 edges=1
            // node 1: object "obj"  id=20 size=16 edges=0
            nodes: vec![1, 0, 10, 24, 1, 1, 1, 20, 16, 0],
            // edge: property "foo" -> node at base offset 5 (node 1)
            edges: vec![2, 2, 5],
            strings: vec!["root".into(), "obj".into(), "foo".into()],
        }
    }

    fn schema(dump: &HeapDump) -> ResolvedSchema {
        ResolvedSchema::resolve(&dump.snapshot.meta).unwrap()
    }

    // ── Node table ────────────────────────────────────────────────

    #[test]
    fn test_node_table_rows_in_index_order() {
        let dump = sample_dump();
        let nodes = NodeTable::build(&dump, &schema(&dump)).unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes.columns,
            vec!["type", "name", "id", "self_size", "edge_count"]
        );
        assert_eq!(
            nodes.rows[0],
            vec![
                Value::Text("object".into()),
                Value::Text("root".into()),
                Value::Int(10),
                Value::Int(24),
                Value::Int(1),
            ]
        );
        assert_eq!(nodes.id(1), &Value::Int(20));
        assert_eq!(nodes.edge_count(0).unwrap(), 1);
        assert_eq!(nodes.edge_count(1).unwrap(), 0);
    }

    #[test]
    fn test_node_table_missing_id_field() {
        let mut dump = sample_dump();
        dump.snapshot.meta.node_fields[2] = "identity".to_string();
        let err = NodeTable::build(&dump, &schema(&dump)).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingField(f) if f == "id"));
    }

    #[test]
    fn test_node_array_length_mismatch() {
        let mut dump = sample_dump();
        dump.nodes.pop();
        let err = NodeTable::build(&dump, &schema(&dump)).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::NodeArrayLength {
                count: 2,
                width: 5,
                actual: 9,
            }
        ));
    }

    #[test]
    fn test_node_string_index_out_of_range_is_fatal() {
        let mut dump = sample_dump();
        dump.nodes[1] = 99; // name slot of node 0
        let err = NodeTable::build(&dump, &schema(&dump)).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::StringIndexOutOfRange { index: 99, .. }
        ));
    }

    // ── Edge table ────────────────────────────────────────────────

    #[test]
    fn test_edge_table_resolves_target_identity() {
        let dump = sample_dump();
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let edges = EdgeTable::build(&dump, &s, &nodes).unwrap();

        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges.columns,
            vec!["from_node", "type", "name_or_index", "to_node"]
        );
        assert_eq!(
            edges.rows[0],
            vec![
                Value::Int(10),
                Value::Text("property".into()),
                Value::Text("foo".into()),
                Value::Int(20),
            ]
        );
    }

    #[test]
    fn test_edge_spans_follow_owning_node_order() {
        let mut dump = sample_dump();
        // node 0 owns two edges, node 1 owns one
        dump.snapshot.edge_count = Some(3);
        dump.nodes[4] = 2;
        dump.nodes[9] = 1;
        dump.edges = vec![
            2, 2, 5, // node 0: property "foo" -> node 1
            1, 0, 0, // node 0: element "root" -> node 0
            0, 2, 0, // node 1: context "foo" -> node 0
        ];

        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let edges = EdgeTable::build(&dump, &s, &nodes).unwrap();

        assert_eq!(edges.len(), 3);
        let owners: Vec<&Value> = edges.rows.iter().map(|r| &r[0]).collect();
        assert_eq!(
            owners,
            vec![&Value::Int(10), &Value::Int(10), &Value::Int(20)]
        );
        // within node 0, edge-array order is preserved
        assert_eq!(edges.rows[0][3], Value::Int(20));
        assert_eq!(edges.rows[1][3], Value::Int(10));
    }

    #[test]
    fn test_edge_array_too_long_yields_zero_rows() {
        let mut dump = sample_dump();
        dump.edges.extend([2, 2, 0]); // one undeclared edge
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InconsistentEdgeCount {
                declared: 1,
                width: 3,
                actual: 6,
            }
        ));
    }

    #[test]
    fn test_edge_array_too_short_yields_zero_rows() {
        let mut dump = sample_dump();
        dump.edges.truncate(2);
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InconsistentEdgeCount { actual: 2, .. }
        ));
    }

    #[test]
    fn test_declared_total_mismatch() {
        let mut dump = sample_dump();
        dump.snapshot.edge_count = Some(5);
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::EdgeTotalMismatch {
                declared: 5,
                actual: 1,
            }
        ));
    }

    #[test]
    fn test_non_numeric_edge_count_is_fatal() {
        let mut dump = sample_dump();
        dump.snapshot.meta.node_types[4] = RawType::Name("string".into());
        dump.nodes[4] = 0; // now decodes to "root"
        dump.nodes[9] = 0;
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::NonNumericEdgeCount { node: 0 }
        ));
    }

    #[test]
    fn test_misaligned_node_ref_is_fatal() {
        let mut dump = sample_dump();
        dump.edges[2] = 3; // not a multiple of the node width
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(err, SnapshotError::BadNodeRef { offset: 3 }));
    }

    #[test]
    fn test_out_of_range_node_ref_is_fatal() {
        let mut dump = sample_dump();
        dump.edges[2] = 10; // aligned, but past the last record
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(err, SnapshotError::BadNodeRef { offset: 10 }));
    }

    #[test]
    fn test_unsupported_edge_field_type() {
        let mut dump = sample_dump();
        dump.snapshot.meta.edge_types[2] = RawType::Name("detachedness".into());
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        let err = EdgeTable::build(&dump, &s, &nodes).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedFieldType(kind) if kind == "detachedness"));
    }

    #[test]
    fn test_empty_graph() {
        let dump = HeapDump {
            snapshot: SnapshotInfo {
                meta: sample_meta(),
                node_count: 0,
                edge_count: None,
            },
            nodes: vec![],
            edges: vec![],
            strings: vec![],
        };
        let s = schema(&dump);
        let nodes = NodeTable::build(&dump, &s).unwrap();
        assert!(nodes.is_empty());
        let edges = EdgeTable::build(&dump, &s, &nodes).unwrap();
        assert!(edges.is_empty());
    }
}
