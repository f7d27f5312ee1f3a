// crates/ingest-bench-relational-store/src/sqlite_connection.rs
// ============================================================================
// Module: SQLite Connection
// Description: rusqlite implementation of the relational connection seam.
// Purpose: Run the relational adapter against local files or memory.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! `SQLite` steps statements lazily, so streaming needs no explicit cursor;
//! `fetch_size` is accepted for interface parity and ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use ingest_bench_core::FieldSpec;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params_from_iter;

use crate::config::RelationalEngine;
use crate::connection::RelationalConnection;
use crate::connection::RowVisitor;
use crate::error::RelationalStoreError;
use crate::sql::insert_sql;
use crate::value::SqlRow;
use crate::value::SqlValue;

/// Busy timeout applied to every connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Connection
// ============================================================================

/// `SQLite` connection.
pub struct SqliteConnection {
    /// Underlying connection.
    connection: Connection,
}

impl SqliteConnection {
    /// Opens a database file, or an in-memory database for `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError::Connection`] when the database cannot
    /// be opened.
    pub fn open(path: &str) -> Result<Self, RelationalStoreError> {
        let connection = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
            Connection::open_with_flags(path, flags)
        }
        .map_err(|err| RelationalStoreError::Connection(err.to_string()))?;
        connection.busy_timeout(BUSY_TIMEOUT).map_err(|err| RelationalStoreError::Connection(err.to_string()))?;
        Ok(Self {
            connection,
        })
    }
}

impl RelationalConnection for SqliteConnection {
    fn engine(&self) -> RelationalEngine {
        RelationalEngine::Sqlite
    }

    fn execute(&mut self, sql: &str) -> Result<(), RelationalStoreError> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }

    fn insert_rows(&mut self, table: &str, columns: &[FieldSpec], rows: &[Vec<SqlValue>]) -> Result<usize, RelationalStoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let sql = insert_sql(RelationalEngine::Sqlite, table, columns, rows.len());
        let tx = self.connection.transaction()?;
        let inserted = tx.execute(&sql, params_from_iter(rows.iter().flatten()))?;
        tx.commit()?;
        Ok(inserted)
    }

    fn stream_rows(&mut self, sql: &str, _fetch_size: usize, visit: &mut RowVisitor<'_>) -> Result<u64, RelationalStoreError> {
        let mut statement = self.connection.prepare(sql)?;
        let names: Vec<String> = statement.column_names().into_iter().map(str::to_string).collect();
        let mut rows = statement.query([])?;
        let mut count = 0;
        while let Some(row) = rows.next()? {
            let mut decoded: SqlRow = Vec::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                decoded.push((name.clone(), SqlValue::from(row.get_ref(index)?)));
            }
            visit(decoded)?;
            count += 1;
        }
        Ok(count)
    }

    fn count_rows(&mut self, sql: &str, _fetch_size: usize) -> Result<u64, RelationalStoreError> {
        let mut statement = self.connection.prepare(sql)?;
        let mut rows = statement.query([])?;
        let mut count = 0;
        while rows.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}
