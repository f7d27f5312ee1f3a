// crates/ingest-bench-relational-store/src/error.rs
// ============================================================================
// Module: Relational Store Errors
// Description: Connection, statement, and partial-write failures.
// Purpose: Report how much of a sequential write committed before failing.
// Dependencies: ingest-bench-core, thiserror
// ============================================================================

//! ## Overview
//! Sub-batches commit independently, so a failure after the first commit is
//! reported as [`RelationalStoreError::PartialWrite`] with the committed
//! record count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::MetricsError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Relational-store failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelationalStoreError {
    /// Connection could not be opened or was lost.
    #[error("relational store connection error: {0}")]
    Connection(String),
    /// Statement failed to prepare or execute.
    #[error("relational store statement error: {0}")]
    Statement(String),
    /// Invalid input or configuration.
    #[error("relational store invalid input: {0}")]
    Invalid(String),
    /// A sub-batch failed after earlier sub-batches committed.
    #[error("relational store write failed after {committed_records} committed record(s): {source}")]
    PartialWrite {
        /// Records committed before the failure.
        committed_records: usize,
        /// Failure of the sub-batch that did not commit.
        source: Box<Self>,
    },
    /// Duration sample could not be persisted.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl From<RelationalStoreError> for BackendError {
    fn from(err: RelationalStoreError) -> Self {
        Self::write(Backend::RelationalStore, err.to_string())
    }
}

impl From<rusqlite::Error> for RelationalStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Statement(err.to_string())
    }
}

impl From<postgres::Error> for RelationalStoreError {
    fn from(err: postgres::Error) -> Self {
        if err.is_closed() { Self::Connection(err.to_string()) } else { Self::Statement(err.to_string()) }
    }
}
