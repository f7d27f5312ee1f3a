// crates/ingest-bench-core/src/backend.rs
// ============================================================================
// Module: Backend Interfaces
// Description: Uniform write and query contracts implemented by each adapter.
// Purpose: Let the driver fan records and queries out without backend knowledge.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every storage adapter exposes a [`RecordWriter`] and a [`QueryRunner`].
//! Adapter-specific error classifiers collapse into [`BackendError`] at this
//! boundary so the driver can isolate failures per backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::catalog::QueryPayload;
use crate::record::Record;
use crate::timing::Backend;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure surfaced by an adapter through the uniform contracts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{backend} {operation} failed: {message}")]
pub struct BackendError {
    /// Backend that failed.
    pub backend: Backend,
    /// Operation label (`write` or `query`).
    pub operation: &'static str,
    /// Failure detail.
    pub message: String,
}

impl BackendError {
    /// Builds a write failure.
    #[must_use]
    pub fn write(backend: Backend, message: impl Into<String>) -> Self {
        Self {
            backend,
            operation: "write",
            message: message.into(),
        }
    }

    /// Builds a query failure.
    #[must_use]
    pub fn query(backend: Backend, message: impl Into<String>) -> Self {
        Self {
            backend,
            operation: "query",
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Contracts
// ============================================================================

/// Persists batches of records to one backend.
pub trait RecordWriter: Send + Sync {
    /// Returns the backend this writer targets.
    fn backend(&self) -> Backend;

    /// Persists the records, returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on any failure the adapter cannot recover.
    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError>;
}

/// Executes opaque query payloads against one backend.
pub trait QueryRunner: Send + Sync {
    /// Returns the backend this runner targets.
    fn backend(&self) -> Backend;

    /// Runs the query and fully drains the result, returning the row count.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the query fails or the payload has the
    /// wrong form for this backend.
    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError>;
}
