// crates/ingest-bench-search-store/src/config.rs
// ============================================================================
// Module: Search Store Configuration
// Description: Endpoint, batching, retry, and paging settings.
// Purpose: Make every search-store retry policy explicit configuration.
// Dependencies: ingest-bench-core, serde
// ============================================================================

//! ## Overview
//! [`SearchStoreConfig`] is deserialized from the `[search_store]` section.
//! Backoff "time units" are plain milliseconds so tests can shrink them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use ingest_bench_core::BackoffPolicy;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SearchStoreError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Doubling backoff for throttled or timed-out requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// First delay in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Largest delay in milliseconds that may still be slept.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// Returns the backoff policy.
    #[must_use]
    pub const fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::from_millis(self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Search-store adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchStoreConfig {
    /// Base URL of the cluster (scheme, host, optional port).
    pub url: String,
    /// Collection receiving benchmark events.
    #[serde(default = "default_index")]
    pub index: String,
    /// Basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Records per bulk request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Concurrent bulk requests.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Backoff for 429 and 504 responses.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Adapter-wide pause after a gateway timeout, in milliseconds.
    #[serde(default = "default_gateway_timeout_cooldown_ms")]
    pub gateway_timeout_cooldown_ms: u64,
    /// Error types that are dropped instead of failing a request.
    #[serde(default = "default_ignored_item_errors")]
    pub ignored_item_errors: Vec<String>,
    /// Hits per page for scroll and cursor reads.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Scroll context keep-alive.
    #[serde(default = "default_scroll_keep_alive")]
    pub scroll_keep_alive: String,
}

impl SearchStoreConfig {
    /// Creates a configuration with defaults for the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: default_index(),
            username: None,
            password: None,
            timeout_ms: default_timeout_ms(),
            batch_size: default_batch_size(),
            workers: default_workers(),
            retry: RetryConfig::default(),
            gateway_timeout_cooldown_ms: default_gateway_timeout_cooldown_ms(),
            ignored_item_errors: default_ignored_item_errors(),
            page_size: default_page_size(),
            scroll_keep_alive: default_scroll_keep_alive(),
        }
    }

    /// Returns the gateway-timeout cooldown.
    #[must_use]
    pub const fn gateway_timeout_cooldown(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_cooldown_ms)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SearchStoreError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(SearchStoreError::Invalid("url must use http or https".to_string()));
        }
        if self.index.trim().is_empty() || self.index.contains('/') {
            return Err(SearchStoreError::Invalid("index must be a single path segment".to_string()));
        }
        if self.batch_size == 0 || self.workers == 0 || self.page_size == 0 {
            return Err(SearchStoreError::Invalid("batch_size, workers, and page_size must be positive".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(SearchStoreError::Invalid("username and password must be set together".to_string()));
        }
        if self.retry.base_delay_ms == 0 || self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(SearchStoreError::Invalid("retry delays must satisfy 0 < base <= max".to_string()));
        }
        Ok(())
    }
}

/// Default collection name.
fn default_index() -> String {
    "monitoring_events".to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default records per bulk request.
const fn default_batch_size() -> usize {
    500
}

/// Default concurrent bulk requests.
const fn default_workers() -> usize {
    10
}

/// Default first backoff delay (one unit of one second).
const fn default_base_delay_ms() -> u64 {
    1_000
}

/// Default backoff ceiling (sixty units).
const fn default_max_delay_ms() -> u64 {
    60_000
}

/// Default gateway-timeout cooldown (ten units).
const fn default_gateway_timeout_cooldown_ms() -> u64 {
    10_000
}

/// Default ignored error types.
fn default_ignored_item_errors() -> Vec<String> {
    vec!["resource_already_exists_exception".to_string()]
}

/// Default hits per page.
const fn default_page_size() -> usize {
    1_000
}

/// Default scroll keep-alive.
fn default_scroll_keep_alive() -> String {
    "1m".to_string()
}
