// crates/ingest-bench-timeseries-store/src/config.rs
// ============================================================================
// Module: Time-Series Store Configuration
// Description: Target table, field roles, and batching for the adapter.
// Purpose: Make the dimension/measure split and request sizes explicit.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`TimeSeriesStoreConfig`] is deserialized from the `[timeseries_store]`
//! section. Field roles default to the ingestion event layout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::TimeSeriesError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest number of records the service accepts per write.
pub const MAX_WRITE_BATCH: usize = 100;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Time-series adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSeriesStoreConfig {
    /// Database name.
    pub database: String,
    /// Table name.
    #[serde(default = "default_table")]
    pub table: String,
    /// AWS region (optional; falls back to environment configuration).
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (disables endpoint discovery).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Records per write request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Concurrent write requests.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Field carrying the event time in epoch milliseconds.
    #[serde(default = "default_time_field")]
    pub time_field: String,
    /// Name of the multi-measure group.
    #[serde(default = "default_measure_name")]
    pub measure_name: String,
    /// Low-cardinality grouping fields.
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<String>,
    /// Tracked value fields.
    #[serde(default = "default_measures")]
    pub measures: Vec<String>,
    /// Fields always tagged as strings regardless of declared type.
    #[serde(default = "default_string_fields")]
    pub string_fields: Vec<String>,
    /// Rows per query page.
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

impl TimeSeriesStoreConfig {
    /// Creates a configuration with defaults for the given database.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: default_table(),
            region: None,
            endpoint: None,
            batch_size: default_batch_size(),
            workers: default_workers(),
            time_field: default_time_field(),
            measure_name: default_measure_name(),
            dimensions: default_dimensions(),
            measures: default_measures(),
            string_fields: default_string_fields(),
            page_size: default_page_size(),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Invalid`] when a value is out of range or a
    /// field is assigned more than one role.
    pub fn validate(&self) -> Result<(), TimeSeriesError> {
        if self.database.trim().is_empty() || self.table.trim().is_empty() {
            return Err(TimeSeriesError::Invalid("database and table must be set".to_string()));
        }
        if self.batch_size == 0 || self.batch_size > MAX_WRITE_BATCH {
            return Err(TimeSeriesError::Invalid(format!("batch_size must be within 1..={MAX_WRITE_BATCH}")));
        }
        if self.workers == 0 {
            return Err(TimeSeriesError::Invalid("workers must be positive".to_string()));
        }
        if self.page_size <= 0 {
            return Err(TimeSeriesError::Invalid("page_size must be positive".to_string()));
        }
        if self.measures.is_empty() {
            return Err(TimeSeriesError::Invalid("at least one measure is required".to_string()));
        }
        if let Some(shared) = self.dimensions.iter().find(|name| self.measures.contains(name) || **name == self.time_field) {
            return Err(TimeSeriesError::Invalid(format!("field {shared} has more than one role")));
        }
        if self.measures.contains(&self.time_field) {
            return Err(TimeSeriesError::Invalid(format!("time field {} cannot be a measure", self.time_field)));
        }
        Ok(())
    }
}

/// Default table name.
fn default_table() -> String {
    "monitoring_events".to_string()
}

/// Default records per write.
const fn default_batch_size() -> usize {
    MAX_WRITE_BATCH
}

/// Default concurrent writes.
const fn default_workers() -> usize {
    10
}

/// Default time field.
fn default_time_field() -> String {
    "time".to_string()
}

/// Default measure group name.
fn default_measure_name() -> String {
    "record".to_string()
}

/// Default dimension fields.
fn default_dimensions() -> Vec<String> {
    [
        "ingestion_batch_id",
        "org_id",
        "user_id",
        "repo_id",
        "repo_version",
        "priority",
        "job_id",
        "job_type",
        "created_at",
        "dataset_id",
        "num_stages",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Default measure fields.
fn default_measures() -> Vec<String> {
    ["stage", "stage_progress", "errored", "finished"].into_iter().map(str::to_string).collect()
}

/// Default string-tagged fields.
fn default_string_fields() -> Vec<String> {
    vec!["created_at".to_string(), "num_stages".to_string()]
}

/// Default rows per query page.
const fn default_page_size() -> i32 {
    100
}
