// crates/ingest-bench-search-store/src/error.rs
// ============================================================================
// Module: Search Store Errors
// Description: Tagged failure classifier for search-store requests.
// Purpose: Separate retryable, splittable, and fatal search failures.
// Dependencies: ingest-bench-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SearchStoreError`] distinguishes oversize payloads and exhausted
//! throttling retries from per-item rejections and plain request failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::MetricsError;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Search-store failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchStoreError {
    /// Request could not be sent or its response read.
    #[error("search store transport error: {0}")]
    Transport(String),
    /// Non-success status or an unignored error object.
    #[error("search store request failed with status {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error payload or body excerpt.
        detail: Value,
    },
    /// A single record still exceeds the payload limit.
    #[error("search store payload too large for {records} record(s)")]
    PayloadTooLarge {
        /// Records in the rejected request.
        records: usize,
    },
    /// Throttling or gateway timeouts outlasted the backoff schedule.
    #[error("search store gave up after {attempts} attempts (last status {status})")]
    Throttled {
        /// Last status observed.
        status: u16,
        /// Attempts made.
        attempts: usize,
    },
    /// Bulk response carried unignored per-item errors.
    #[error("search store bulk request had {} item error(s)", .0.len())]
    ItemErrors(Vec<Value>),
    /// Invalid input or configuration.
    #[error("search store invalid input: {0}")]
    Invalid(String),
    /// Duration sample could not be persisted.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
