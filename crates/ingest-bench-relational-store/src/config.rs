// crates/ingest-bench-relational-store/src/config.rs
// ============================================================================
// Module: Relational Store Configuration
// Description: Engine selection, table naming, and batching settings.
// Purpose: Describe where and how event rows are stored.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`RelationalStoreConfig`] is deserialized from `[relational_store]`. Table
//! and column names are interpolated into DDL, so validation restricts them
//! to plain identifiers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::ingestion_event_schema;
use serde::Deserialize;
use serde::Serialize;

use crate::error::RelationalStoreError;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationalEngine {
    /// `PostgreSQL` over the `postgres` client.
    #[default]
    Postgres,
    /// `SQLite` file or in-memory database.
    Sqlite,
}

impl RelationalEngine {
    /// Returns the engine label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the most bound parameters one statement may carry.
    #[must_use]
    pub const fn max_bind_parameters(self) -> usize {
        match self {
            Self::Postgres => 65_535,
            Self::Sqlite => 32_766,
        }
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Relational-store adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationalStoreConfig {
    /// Database engine.
    #[serde(default)]
    pub engine: RelationalEngine,
    /// Connection string (`postgres`) or database path (`sqlite`, `:memory:`
    /// allowed).
    pub url: String,
    /// Event table name.
    #[serde(default = "default_table")]
    pub table: String,
    /// Rows per insert transaction.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Rows fetched per server-side cursor round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Columns that receive a secondary index.
    #[serde(default = "default_indexed_columns")]
    pub indexed_columns: Vec<String>,
}

impl RelationalStoreConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new(engine: RelationalEngine, url: impl Into<String>) -> Self {
        Self {
            engine,
            url: url.into(),
            table: default_table(),
            batch_size: default_batch_size(),
            fetch_size: default_fetch_size(),
            indexed_columns: default_indexed_columns(),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError::Invalid`] when a value is out of range
    /// or a name is not a plain identifier.
    pub fn validate(&self) -> Result<(), RelationalStoreError> {
        if self.url.trim().is_empty() {
            return Err(RelationalStoreError::Invalid("url must not be empty".to_string()));
        }
        if self.batch_size == 0 || self.fetch_size == 0 {
            return Err(RelationalStoreError::Invalid("batch_size and fetch_size must be positive".to_string()));
        }
        if i32::try_from(self.fetch_size).is_err() {
            return Err(RelationalStoreError::Invalid("fetch_size exceeds the cursor limit".to_string()));
        }
        self.check_insert_width(ingestion_event_schema().fields().len())?;
        ensure_identifier(&self.table)?;
        for column in &self.indexed_columns {
            ensure_identifier(column)?;
        }
        Ok(())
    }

    /// Checks that one `batch_size`-row insert of `columns` columns fits the
    /// engine's bound-parameter limit.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError::Invalid`] when the insert would bind
    /// more parameters than the engine accepts.
    pub fn check_insert_width(&self, columns: usize) -> Result<(), RelationalStoreError> {
        let limit = self.engine.max_bind_parameters();
        let parameters = self.batch_size.saturating_mul(columns);
        if parameters > limit {
            return Err(RelationalStoreError::Invalid(format!(
                "batch_size {} binds {parameters} parameters over {columns} columns; {} allows {limit}",
                self.batch_size,
                self.engine.as_str()
            )));
        }
        Ok(())
    }
}

/// Rejects names that are not `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Errors
///
/// Returns [`RelationalStoreError::Invalid`] for any other name.
pub fn ensure_identifier(name: &str) -> Result<(), RelationalStoreError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if valid { Ok(()) } else { Err(RelationalStoreError::Invalid(format!("invalid identifier: {name:?}"))) }
}

/// Default event table.
fn default_table() -> String {
    "monitoring_events".to_string()
}

/// Default rows per insert transaction.
const fn default_batch_size() -> usize {
    500
}

/// Default cursor fetch size.
const fn default_fetch_size() -> usize {
    10_000
}

/// Default indexed columns.
fn default_indexed_columns() -> Vec<String> {
    ["ingestion_batch_id", "user_id", "repo_id", "job_id", "created_at", "time"].into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::RelationalEngine;
    use super::RelationalStoreConfig;
    use super::ensure_identifier;

    #[test]
    fn identifiers_reject_injection() {
        assert!(ensure_identifier("monitoring_events").is_ok());
        assert!(ensure_identifier("_t1").is_ok());
        assert!(ensure_identifier("1table").is_err());
        assert!(ensure_identifier("events; DROP TABLE x").is_err());
        assert!(ensure_identifier("").is_err());
    }

    #[test]
    fn defaults_validate() {
        assert!(RelationalStoreConfig::new(RelationalEngine::Sqlite, ":memory:").validate().is_ok());
        let mut config = RelationalStoreConfig::new(RelationalEngine::Postgres, "host=localhost");
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn insert_width_respects_engine_parameter_limit() {
        let mut config = RelationalStoreConfig::new(RelationalEngine::Postgres, "host=localhost");
        config.batch_size = 4_095;
        assert!(config.check_insert_width(16).is_ok());
        config.batch_size = 4_096;
        assert!(config.check_insert_width(16).is_err());
        assert!(config.validate().is_err());
        config.engine = RelationalEngine::Sqlite;
        config.batch_size = 2_047;
        assert!(config.validate().is_ok());
        config.batch_size = 2_048;
        assert!(config.validate().is_err());
    }
}
