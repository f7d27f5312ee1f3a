// crates/ingest-bench-relational-store/src/sql.rs
// ============================================================================
// Module: SQL Builders
// Description: Dialect-aware DDL and multi-row insert statements.
// Purpose: Derive table, index, and insert SQL from the record schema.
// Dependencies: ingest-bench-core
// ============================================================================

//! ## Overview
//! Statements are built from validated identifiers only; values always travel
//! as bound parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::FieldSpec;
use ingest_bench_core::FieldType;

use crate::config::RelationalEngine;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Returns the column type for a field in the given engine.
#[must_use]
pub const fn column_type(engine: RelationalEngine, field_type: FieldType) -> &'static str {
    match (engine, field_type) {
        (_, FieldType::Text) => "TEXT",
        (RelationalEngine::Postgres, FieldType::Integer) => "BIGINT",
        (RelationalEngine::Postgres, FieldType::Double) => "DOUBLE PRECISION",
        (RelationalEngine::Postgres, FieldType::Boolean) => "BOOLEAN",
        (RelationalEngine::Postgres, FieldType::Timestamp) => "TIMESTAMPTZ",
        (RelationalEngine::Sqlite, FieldType::Double) => "REAL",
        (RelationalEngine::Sqlite, FieldType::Integer | FieldType::Boolean | FieldType::Timestamp) => "INTEGER",
    }
}

/// Returns the surrogate key column definition.
#[must_use]
pub const fn primary_key(engine: RelationalEngine) -> &'static str {
    match engine {
        RelationalEngine::Postgres => "id BIGSERIAL PRIMARY KEY",
        RelationalEngine::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
    }
}

/// Builds `CREATE TABLE IF NOT EXISTS` for the schema columns.
#[must_use]
pub fn create_table_sql(engine: RelationalEngine, table: &str, columns: &[FieldSpec]) -> String {
    let mut definitions = vec![primary_key(engine).to_string()];
    definitions.extend(columns.iter().map(|column| format!("{} {}", column.name, column_type(engine, column.field_type))));
    format!("CREATE TABLE IF NOT EXISTS {table} ({})", definitions.join(", "))
}

/// Builds `CREATE INDEX IF NOT EXISTS <table>__<column>`.
#[must_use]
pub fn create_index_sql(table: &str, column: &str) -> String {
    format!("CREATE INDEX IF NOT EXISTS {table}__{column} ON {table} ({column})")
}

/// Builds a multi-row insert with engine-specific placeholders.
#[must_use]
pub fn insert_sql(engine: RelationalEngine, table: &str, columns: &[FieldSpec], rows: usize) -> String {
    let names: Vec<&str> = columns.iter().map(|column| column.name).collect();
    let width = columns.len();
    let groups: Vec<String> = (0 .. rows)
        .map(|row| {
            let placeholders: Vec<String> = (0 .. width)
                .map(|col| match engine {
                    RelationalEngine::Postgres => format!("${}", row * width + col + 1),
                    RelationalEngine::Sqlite => "?".to_string(),
                })
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!("INSERT INTO {table} ({}) VALUES {}", names.join(", "), groups.join(", "))
}
