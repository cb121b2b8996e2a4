//! Schema resolution from dump metadata.
//!
//! Turns the dump's raw type descriptors into a closed [`FieldType`]
//! variant set, resolved once per run. The decoder matches exhaustively on
//! the result; type names it has never seen become `Reference(name)` and
//! fail at decode time unless a resolver is registered for them.

use crate::dump::{DumpMeta, RawType};
use crate::error::{Result, SnapshotError};

/// Resolved type of one integer slot within a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Value is an index into the dump's string table.
    String,
    /// Value is used verbatim.
    Number,
    /// Value is an index into a per-field enumeration of string values.
    Enum(Vec<String>),
    /// Value requires the named resolver supplied by the caller.
    Reference(String),
}

impl FieldType {
    fn from_raw(raw: &RawType) -> Self {
        match raw {
            RawType::Enum(values) => Self::Enum(values.clone()),
            // "string_or_number" values index the string table, same as
            // "string".
            RawType::Name(name) => match name.as_str() {
                "string" | "string_or_number" => Self::String,
                "number" => Self::Number,
                other => Self::Reference(other.to_string()),
            },
        }
    }
}

/// Ordered field names and their resolved types for one record kind.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub fields: Vec<String>,
    pub types: Vec<FieldType>,
}

impl FieldSchema {
    fn resolve(table: &'static str, fields: &[String], types: &[RawType]) -> Result<Self> {
        // The only metadata validation: each field list must pair 1:1 with
        // its type list. A mismatch means the dump is malformed.
        if fields.len() != types.len() {
            return Err(SnapshotError::MetaLengthMismatch {
                table,
                fields: fields.len(),
                types: types.len(),
            });
        }
        Ok(Self {
            fields: fields.to_vec(),
            types: types.iter().map(FieldType::from_raw).collect(),
        })
    }

    /// Number of integer slots per record.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Positional index of a field by name.
    ///
    /// Field order is schema-driven, not fixed; callers look positions up
    /// once per run and cache them.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| SnapshotError::MissingField(name.to_string()))
    }
}

/// Field lists and types for both record kinds, resolved once per run.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub node: FieldSchema,
    pub edge: FieldSchema,
}

impl ResolvedSchema {
    pub fn resolve(meta: &DumpMeta) -> Result<Self> {
        Ok(Self {
            node: FieldSchema::resolve("node", &meta.node_fields, &meta.node_types)?,
            edge: FieldSchema::resolve("edge", &meta.edge_fields, &meta.edge_types)?,
        })
    }
}
