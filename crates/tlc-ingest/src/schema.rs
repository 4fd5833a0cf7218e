//! Column schema for a destination table
//!
//! A [`TableSchema`] is the declared mapping of column name to value type for
//! one ingestion run. It is fixed before reading begins and invariant across
//! all batches of the run: the source reader coerces every row against it,
//! and the storage layer derives the `CREATE TABLE` statement from it.

use tlc_common::{IngestError, Result};

/// Value type a column is declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Nullable 64-bit integer (BIGINT)
    Integer,
    /// Floating point (DOUBLE PRECISION)
    Float,
    /// Free text (TEXT)
    Text,
    /// Timestamp without time zone (TIMESTAMP)
    Timestamp,
}

impl ColumnType {
    /// PostgreSQL type name for this column type
    pub fn postgres_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    /// Human-readable name used in coercion diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered set of declared columns for one destination table
///
/// Column order here defines the column order of the destination table and
/// of every [`crate::record::Row`] produced by the source reader, regardless
/// of the column order in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from (name, type) pairs
    ///
    /// Duplicate column names are rejected; a schema with a duplicate could
    /// never match a CSV header unambiguously.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if col.name.is_empty() {
                return Err(IngestError::config("schema column name cannot be empty"));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(IngestError::Config(format!(
                    "duplicate column in schema: {}",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// `CREATE TABLE` statement for this schema
    ///
    /// Every column is nullable; the archive files carry empty fields in
    /// most columns at one point or another.
    pub fn create_table_sql(&self, table: &str) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.ty.postgres_type()))
            .collect();
        format!("CREATE TABLE \"{}\" ({})", table, cols.join(", "))
    }

    /// Column list fragment for an `INSERT` statement
    pub fn insert_columns_sql(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect();
        cols.join(", ")
    }
}
