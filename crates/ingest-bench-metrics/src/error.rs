// crates/ingest-bench-metrics/src/error.rs
// ============================================================================
// Module: Metrics Store Errors
// Description: Failures opening or reading durable metrics stores.
// Purpose: Keep setup failures distinct from per-sample append failures.
// Dependencies: ingest-bench-core, thiserror
// ============================================================================

//! ## Overview
//! Append failures surface as [`MetricsError`] through the sink trait.
//! [`MetricsStoreError`] covers opening a store and reading samples back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::MetricsError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Metrics store setup and read failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsStoreError {
    /// Database or service failure.
    #[error("metrics store error: {0}")]
    Db(String),
    /// Invalid configuration or stored data.
    #[error("metrics store invalid: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for MetricsStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<MetricsStoreError> for MetricsError {
    fn from(err: MetricsStoreError) -> Self {
        match err {
            MetricsStoreError::Db(detail) => Self::Io(detail),
            MetricsStoreError::Invalid(detail) => Self::Encoding(detail),
        }
    }
}
