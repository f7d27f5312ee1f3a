// crates/ingest-bench-relational-store/src/connection.rs
// ============================================================================
// Module: Relational Connection
// Description: Engine-neutral connection seam and its shared handle.
// Purpose: Let the writer and reader share one connection of either engine.
// Dependencies: ingest-bench-core
// ============================================================================

//! ## Overview
//! [`RelationalConnection`] covers DDL, transactional multi-row inserts, and
//! cursor-driven reads. One connection is opened per adapter and shared by
//! the writer and reader behind a mutex, so access is serialized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use ingest_bench_core::FieldSpec;

use crate::config::RelationalEngine;
use crate::config::RelationalStoreConfig;
use crate::error::RelationalStoreError;
use crate::postgres_connection::PostgresConnection;
use crate::sqlite_connection::SqliteConnection;
use crate::value::SqlRow;
use crate::value::SqlValue;

// ============================================================================
// SECTION: Connection Trait
// ============================================================================

/// Row visitor used while streaming results.
pub type RowVisitor<'a> = dyn FnMut(SqlRow) -> Result<(), RelationalStoreError> + 'a;

/// Database operations used by the adapter.
pub trait RelationalConnection: Send {
    /// Returns the engine behind this connection.
    fn engine(&self) -> RelationalEngine;

    /// Executes a statement with no parameters or results.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the statement fails.
    fn execute(&mut self, sql: &str) -> Result<(), RelationalStoreError>;

    /// Inserts rows in one transaction, returning the rows inserted.
    ///
    /// Nothing is committed when the call fails.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the insert or commit fails.
    fn insert_rows(&mut self, table: &str, columns: &[FieldSpec], rows: &[Vec<SqlValue>]) -> Result<usize, RelationalStoreError>;

    /// Streams decoded rows through `visit`, fetching `fetch_size` at a time.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the query fails, a column cannot
    /// be decoded, or `visit` fails.
    fn stream_rows(&mut self, sql: &str, fetch_size: usize, visit: &mut RowVisitor<'_>) -> Result<u64, RelationalStoreError>;

    /// Drains a query without decoding cells, returning the row count.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the query fails.
    fn count_rows(&mut self, sql: &str, fetch_size: usize) -> Result<u64, RelationalStoreError>;
}

/// Connection shared by one adapter's writer and reader.
pub type SharedConnection = Arc<Mutex<Box<dyn RelationalConnection>>>;

/// Opens the configured engine's connection.
///
/// # Errors
///
/// Returns [`RelationalStoreError`] when the settings are invalid or the
/// database cannot be reached.
pub fn open_connection(config: &RelationalStoreConfig) -> Result<SharedConnection, RelationalStoreError> {
    config.validate()?;
    let connection: Box<dyn RelationalConnection> = match config.engine {
        RelationalEngine::Postgres => Box::new(PostgresConnection::connect(&config.url)?),
        RelationalEngine::Sqlite => Box::new(SqliteConnection::open(&config.url)?),
    };
    Ok(share(connection))
}

/// Wraps a connection for sharing.
#[must_use]
pub fn share(connection: Box<dyn RelationalConnection>) -> SharedConnection {
    Arc::new(Mutex::new(connection))
}
