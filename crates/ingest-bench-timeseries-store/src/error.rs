// crates/ingest-bench-timeseries-store/src/error.rs
// ============================================================================
// Module: Time-Series Store Errors
// Description: Failure classifier for time-series writes and queries.
// Purpose: Separate per-record rejections from fatal service failures.
// Dependencies: ingest-bench-core, thiserror
// ============================================================================

//! ## Overview
//! [`TimeSeriesError::Rejected`] carries the records the service refused in
//! an otherwise accepted request. The writer logs and skips those; every
//! other variant is fatal.

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

/// One record refused by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record within its request.
    pub index: usize,
    /// Service-reported reason.
    pub reason: String,
}

/// Time-series store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeSeriesError {
    /// Some records in a request were refused.
    #[error("time-series store rejected {} record(s)", .0.len())]
    Rejected(Vec<RejectedRecord>),
    /// Any other service or transport failure.
    #[error("time-series store service error: {0}")]
    Service(String),
    /// Invalid input, configuration, or result cell.
    #[error("time-series store invalid input: {0}")]
    Invalid(String),
    /// Duration sample could not be persisted.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl From<TimeSeriesError> for BackendError {
    fn from(err: TimeSeriesError) -> Self {
        Self::write(Backend::TimeseriesStore, err.to_string())
    }
}
