// crates/ingest-bench-log-store/src/config.rs
// ============================================================================
// Module: Log Store Configuration
// Description: Connection and batching settings for the log-store adapter.
// Purpose: Keep batch sizes and query polling explicit and validated.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`LogStoreConfig`] is deserialized from the `[log_store]` section of the
//! benchmark configuration and validated before any client is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::LogStoreError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest batch the service accepts in one put.
pub const MAX_PUT_BATCH: usize = 10_000;
/// Largest page the service returns in one read.
pub const MAX_PAGE_SIZE: i32 = 10_000;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Log-store adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogStoreConfig {
    /// Log group receiving all streams.
    pub log_group: String,
    /// AWS region (optional; falls back to environment configuration).
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (for local emulators).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Records per put request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Events per read page.
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    /// Delay between Insights polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub query_poll_interval_ms: u64,
    /// Maximum time to wait for an Insights query in milliseconds.
    #[serde(default = "default_query_max_wait_ms")]
    pub query_max_wait_ms: u64,
    /// Insights query window reaching back from now, in seconds.
    #[serde(default = "default_query_lookback_s")]
    pub query_lookback_s: i64,
}

impl LogStoreConfig {
    /// Creates a configuration with defaults for the given log group.
    #[must_use]
    pub fn new(log_group: impl Into<String>) -> Self {
        Self {
            log_group: log_group.into(),
            region: None,
            endpoint: None,
            batch_size: default_batch_size(),
            page_size: default_page_size(),
            query_poll_interval_ms: default_poll_interval_ms(),
            query_max_wait_ms: default_query_max_wait_ms(),
            query_lookback_s: default_query_lookback_s(),
        }
    }

    /// Returns the Insights poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.query_poll_interval_ms)
    }

    /// Returns the Insights wait bound.
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        Duration::from_millis(self.query_max_wait_ms)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), LogStoreError> {
        if self.log_group.trim().is_empty() {
            return Err(LogStoreError::Invalid("log_group must be set".to_string()));
        }
        if self.batch_size == 0 || self.batch_size > MAX_PUT_BATCH {
            return Err(LogStoreError::Invalid(format!("batch_size must be within 1..={MAX_PUT_BATCH}")));
        }
        if self.page_size <= 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(LogStoreError::Invalid(format!("page_size must be within 1..={MAX_PAGE_SIZE}")));
        }
        if self.query_lookback_s <= 0 {
            return Err(LogStoreError::Invalid("query_lookback_s must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default records per put.
const fn default_batch_size() -> usize {
    500
}

/// Default events per read page.
const fn default_page_size() -> i32 {
    100
}

/// Default Insights poll interval.
const fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Default Insights wait bound.
const fn default_query_max_wait_ms() -> u64 {
    300_000
}

/// Default Insights window (seven days).
const fn default_query_lookback_s() -> i64 {
    7 * 24 * 60 * 60
}
