//! Bulk persistence.
//!
//! [`BulkSink`] is the seam between the decode engine and the destination:
//! a destination name, a fixed column list derived once from the resolved
//! schema, and ordered batches of equal-arity rows. One `insert` call is
//! one atomic commit — either every row in the batch becomes visible or
//! none does. Sinks never retry: a bulk insert is not idempotent.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use crate::decode::Value;
use crate::error::{Result, SnapshotError};
use crate::schema::FieldType;

/// Destination for decoded relations.
pub trait BulkSink {
    /// Prepare a destination table: create it from the schema-derived
    /// column list, or verify an existing table against it. `id_column`,
    /// when present among the columns, is the relation key.
    fn prepare(
        &mut self,
        table: &str,
        columns: &[String],
        types: &[FieldType],
        id_column: Option<&str>,
    ) -> Result<()>;

    /// Atomically commit one batch of equal-arity rows.
    fn insert(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> Result<()>;
}

// ── SQLite ─────────────────────────────────────────────────────────

/// SQLite implementation of [`BulkSink`].
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, for testing.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Column names of `table`, or None if the table does not exist.
    fn table_columns(&self, table: &str) -> Result<Option<Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(if columns.is_empty() {
            None
        } else {
            Some(columns)
        })
    }
}

impl BulkSink for SqliteSink {
    fn prepare(
        &mut self,
        table: &str,
        columns: &[String],
        types: &[FieldType],
        id_column: Option<&str>,
    ) -> Result<()> {
        // An existing table's fixed columns must name-match the dump
        // schema, in order. Surfacing the divergence here beats an opaque
        // arity error at insert time.
        if let Some(found) = self.table_columns(table)? {
            if found.as_slice() != columns {
                return Err(SnapshotError::ColumnMismatch {
                    table: table.to_string(),
                    expected: columns.to_vec(),
                    found,
                });
            }
            return Ok(());
        }

        let defs: Vec<String> = columns
            .iter()
            .zip(types)
            .map(|(name, field_type)| {
                let mut def = format!("{} {}", quote_ident(name), sql_type(field_type));
                if Some(name.as_str()) == id_column {
                    def.push_str(" PRIMARY KEY");
                }
                def
            })
            .collect();
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(table),
            defs.join(", ")
        ))?;
        Ok(())
    }

    fn insert(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> Result<()> {
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",");
        let slots = vec!["?"; columns.len()].join(",");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            slots
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter().map(sql_value)))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// SQLite column type for a resolved field type. Reference-typed fields
/// store the resolved target identity.
fn sql_type(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Number | FieldType::Reference(_) => "INTEGER",
        FieldType::String | FieldType::Enum(_) => "TEXT",
    }
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(n) => SqlValue::Integer(*n as i64),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// Quote an identifier. Table and column names come from dump data and
/// are never spliced into SQL bare.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
