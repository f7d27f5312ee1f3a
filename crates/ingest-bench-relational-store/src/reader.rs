// crates/ingest-bench-relational-store/src/reader.rs
// ============================================================================
// Module: Relational Store Reader
// Description: Cursor-streamed query execution over the shared connection.
// Purpose: Drain large result sets without holding them in memory.
// Dependencies: ingest-bench-core
// ============================================================================

//! ## Overview
//! [`RelationalStoreReader::stream_rows`] hands decoded rows to a visitor as
//! they arrive; [`RelationalStoreReader::fetch_all`] collects them. The
//! query runner drains without decoding and reports the row count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::PoisonError;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;

use crate::config::RelationalStoreConfig;
use crate::connection::RowVisitor;
use crate::connection::SharedConnection;
use crate::error::RelationalStoreError;
use crate::value::SqlRow;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Relational-store read adapter.
pub struct RelationalStoreReader {
    /// Shared connection.
    connection: SharedConnection,
    /// Adapter settings.
    config: RelationalStoreConfig,
}

impl RelationalStoreReader {
    /// Creates a reader over a shared connection.
    #[must_use]
    pub const fn new(connection: SharedConnection, config: RelationalStoreConfig) -> Self {
        Self {
            connection,
            config,
        }
    }

    /// Streams rows through `visit`, returning the row count.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the query or the visitor fails.
    pub fn stream_rows(&self, sql: &str, visit: &mut RowVisitor<'_>) -> Result<u64, RelationalStoreError> {
        let mut connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        connection.stream_rows(sql, self.config.fetch_size, visit)
    }

    /// Collects every row of a query.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when the query fails.
    pub fn fetch_all(&self, sql: &str) -> Result<Vec<SqlRow>, RelationalStoreError> {
        let mut rows = Vec::new();
        self.stream_rows(sql, &mut |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok(rows)
    }
}

impl QueryRunner for RelationalStoreReader {
    fn backend(&self) -> Backend {
        Backend::RelationalStore
    }

    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError> {
        let sql = payload.as_text().ok_or_else(|| BackendError::query(Backend::RelationalStore, "relational payloads must be SQL text"))?;
        let mut connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        connection
            .count_rows(sql, self.config.fetch_size)
            .map_err(|err| BackendError::query(Backend::RelationalStore, err.to_string()))
    }
}
