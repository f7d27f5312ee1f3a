// crates/ingest-bench-relational-store/src/value.rs
// ============================================================================
// Module: SQL Values
// Description: Engine-neutral column values for inserts and result rows.
// Purpose: Carry record fields and query cells across both engines.
// Dependencies: ingest-bench-core, rusqlite
// ============================================================================

//! ## Overview
//! [`SqlValue`] mirrors the record field types plus `Null`. `SQLite` stores
//! booleans and timestamps as integers, so rows read back from it report
//! those columns as [`SqlValue::Integer`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::FieldValue;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

// ============================================================================
// SECTION: Values
// ============================================================================

/// One column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Text.
    Text(String),
    /// 64-bit integer.
    Integer(i64),
    /// Double precision.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// Epoch milliseconds.
    Timestamp(i64),
}

impl From<FieldValue> for SqlValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => Self::Text(text),
            FieldValue::Integer(number) => Self::Integer(number),
            FieldValue::Double(number) => Self::Double(number),
            FieldValue::Boolean(flag) => Self::Boolean(flag),
            FieldValue::Timestamp(ms) => Self::Timestamp(ms),
        }
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(number) => Self::Integer(number),
            ValueRef::Real(number) => Self::Double(number),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::from(rusqlite::types::Null),
            Self::Text(text) => ToSqlOutput::from(text.as_str()),
            Self::Integer(number) | Self::Timestamp(number) => ToSqlOutput::from(*number),
            Self::Double(number) => ToSqlOutput::from(*number),
            Self::Boolean(flag) => ToSqlOutput::from(i64::from(*flag)),
        })
    }
}

/// One result row as ordered (column, value) pairs.
pub type SqlRow = Vec<(String, SqlValue)>;
