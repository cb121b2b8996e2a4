//! Typed field decoding.
//!
//! Turns one raw integer slot into a [`Value`] according to its resolved
//! [`FieldType`]. Reference-typed fields dispatch through a resolver table
//! injected by the caller — the decoder itself holds no resolvers and
//! performs no I/O.

use std::collections::HashMap;

use crate::error::{Result, SnapshotError};
use crate::schema::FieldType;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(u64),
}

impl Value {
    /// Numeric view of the value, if it is one.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

type ResolverFn<'a> = Box<dyn Fn(u64) -> Result<Value> + 'a>;

/// Named resolvers for reference-typed fields.
///
/// A resolver converts a raw reference value into a meaningful identity
/// (e.g. "node": flat-array offset → owning node's id). Builders register
/// the resolvers they need; a reference kind with no resolver is the
/// "unsupported field type" condition.
#[derive(Default)]
pub struct ResolverTable<'a> {
    resolvers: HashMap<String, ResolverFn<'a>>,
}

impl<'a> ResolverTable<'a> {
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register a resolver for a reference kind.
    pub fn register<F>(&mut self, kind: impl Into<String>, resolver: F)
    where
        F: Fn(u64) -> Result<Value> + 'a,
    {
        self.resolvers.insert(kind.into(), Box::new(resolver));
    }

    fn get(&self, kind: &str) -> Option<&ResolverFn<'a>> {
        self.resolvers.get(kind)
    }
}

/// Decoder for one record kind: the dump's string table plus whatever
/// resolvers the caller injected.
pub struct FieldDecoder<'a> {
    strings: &'a [String],
    resolvers: ResolverTable<'a>,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(strings: &'a [String], resolvers: ResolverTable<'a>) -> Self {
        Self { strings, resolvers }
    }

    /// Decode one raw slot according to its field type.
    ///
    /// Out-of-range string or enum indexes are fatal: a silently wrong
    /// value would corrupt downstream identity joins.
    pub fn decode(&self, raw: u64, field_type: &FieldType) -> Result<Value> {
        match field_type {
            FieldType::String => match self.strings.get(raw as usize) {
                Some(s) => Ok(Value::Text(s.clone())),
                None => Err(SnapshotError::StringIndexOutOfRange {
                    index: raw,
                    len: self.strings.len(),
                }),
            },
            FieldType::Number => Ok(Value::Int(raw)),
            FieldType::Enum(values) => match values.get(raw as usize) {
                Some(s) => Ok(Value::Text(s.clone())),
                None => Err(SnapshotError::EnumIndexOutOfRange {
                    index: raw,
                    len: values.len(),
                }),
            },
            FieldType::Reference(kind) => match self.resolvers.get(kind) {
                Some(resolve) => resolve(raw),
                None => Err(SnapshotError::UnsupportedFieldType(kind.clone())),
            },
        }
    }
}
