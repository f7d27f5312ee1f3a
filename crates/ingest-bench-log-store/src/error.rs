// crates/ingest-bench-log-store/src/error.rs
// ============================================================================
// Module: Log Store Errors
// Description: Tagged failure classifier for log-store calls.
// Purpose: Drive stream creation and token recovery from typed variants.
// Dependencies: ingest-bench-core, thiserror
// ============================================================================

//! ## Overview
//! Every client call maps its failure into [`LogStoreError`]. The writer
//! recovers from [`LogStoreError::ResourceNotFound`] and
//! [`LogStoreError::InvalidSequenceToken`]; every other variant is fatal.

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

/// Log-store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogStoreError {
    /// Log group or stream does not exist.
    #[error("log store resource not found: {0}")]
    ResourceNotFound(String),
    /// Stream already exists.
    #[error("log store resource already exists: {0}")]
    ResourceAlreadyExists(String),
    /// Continuation token was stale or missing.
    #[error("log store sequence token rejected (expected: {expected:?})")]
    InvalidSequenceToken {
        /// Token the service expects, when it reports one.
        expected: Option<String>,
    },
    /// Insights query did not complete in time.
    #[error("log store query timed out after {0} ms")]
    QueryTimeout(u128),
    /// Insights query ended in a non-success state.
    #[error("log store query ended with status {0}")]
    QueryFailed(String),
    /// Invalid input or configuration.
    #[error("log store invalid input: {0}")]
    Invalid(String),
    /// Any other service or transport failure.
    #[error("log store service error: {0}")]
    Service(String),
    /// Duration sample could not be persisted.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl From<LogStoreError> for BackendError {
    fn from(err: LogStoreError) -> Self {
        Self::write(Backend::LogStore, err.to_string())
    }
}
