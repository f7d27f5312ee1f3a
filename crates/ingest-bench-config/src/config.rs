// crates/ingest-bench-config/src/config.rs
// ============================================================================
// Module: Benchmark Configuration
// Description: Configuration model, file loading, and validation.
// Purpose: Describe which backends a run targets and how each is reached.
// Dependencies: ingest-bench-*, serde, toml
// ============================================================================

//! ## Overview
//! [`BenchConfig`] is read from `ingest-bench.toml`. The file is resolved
//! from an explicit path, then `INGEST_BENCH_CONFIG`, then the working
//! directory. Loading is fail-closed: oversized, non-UTF-8, unparsable, or
//! inconsistent files are rejected before any backend is contacted.
//!
//! Each backend section is optional. An absent section disables that
//! backend for the run; at least one must be present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ingest_bench_core::Backend;
use ingest_bench_core::job::FAILURE_RATES;
use ingest_bench_core::job::NUM_STAGES;
use ingest_bench_log_store::LogStoreConfig;
use ingest_bench_metrics::DynamoDbMetricsConfig;
use ingest_bench_metrics::SqliteMetricsConfig;
use ingest_bench_relational_store::RelationalStoreConfig;
use ingest_bench_search_store::SearchStoreConfig;
use ingest_bench_timeseries_store::TimeSeriesStoreConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "ingest-bench.toml";
/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "INGEST_BENCH_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound on jobs drawn for one batch pair.
pub const MAX_JOBS_PER_PAIR: usize = 1_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The file is not valid TOML for the model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The file parsed but is inconsistent or out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Destination for duration samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSinkKind {
    /// Keep samples in process memory.
    #[default]
    Memory,
    /// Append one JSON object per line to `path`.
    JsonLines,
    /// Insert rows into the `SQLite` database at `path`.
    Sqlite,
    /// Put items into the DynamoDB `table`.
    Dynamodb,
}

/// `[metrics]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: MetricsSinkKind,
    /// Output file for `json_lines` and `sqlite`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Table for `dynamodb`.
    #[serde(default)]
    pub table: Option<String>,
    /// AWS region for `dynamodb`.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for `dynamodb`.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl MetricsConfig {
    /// Returns `SQLite` sink settings when the sink is `sqlite`.
    #[must_use]
    pub fn sqlite(&self) -> Option<SqliteMetricsConfig> {
        match (self.sink, &self.path) {
            (MetricsSinkKind::Sqlite, Some(path)) => Some(SqliteMetricsConfig::new(path.clone())),
            _ => None,
        }
    }

    /// Returns DynamoDB sink settings when the sink is `dynamodb`.
    #[must_use]
    pub fn dynamodb(&self) -> Option<DynamoDbMetricsConfig> {
        match (self.sink, &self.table) {
            (MetricsSinkKind::Dynamodb, Some(table)) => Some(DynamoDbMetricsConfig {
                table: table.clone(),
                region: self.region.clone(),
                endpoint: self.endpoint.clone(),
            }),
            _ => None,
        }
    }

    /// Validates the section.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.sink {
            MetricsSinkKind::Memory => Ok(()),
            MetricsSinkKind::JsonLines | MetricsSinkKind::Sqlite => match &self.path {
                Some(path) => validate_path_string("metrics.path", &path.to_string_lossy()),
                None => Err(ConfigError::Invalid("metrics.path is required for file sinks".to_string())),
            },
            MetricsSinkKind::Dynamodb => match self.table.as_deref().map(str::trim) {
                Some(table) if !table.is_empty() => Ok(()),
                _ => Err(ConfigError::Invalid("metrics.table is required for the dynamodb sink".to_string())),
            },
        }
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Destination for structured log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `path`.
    File,
    /// Discard events.
    None,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Output file for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates the section.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, Some(path)) => validate_path_string("logging.path", &path.to_string_lossy()),
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for the file sink".to_string()))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// `[generator]` section: synthetic workload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Fewest jobs drawn for a batch pair.
    #[serde(default = "default_min_jobs")]
    pub min_jobs: usize,
    /// Most jobs drawn for a batch pair.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    /// Failure-rate choices, each drawn per batch.
    #[serde(default = "default_failure_rates")]
    pub failure_rates: Vec<f64>,
    /// Write rounds per batch; one per stage plus the initial state.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Seed for reproducible workloads.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_jobs: default_min_jobs(),
            max_jobs: default_max_jobs(),
            failure_rates: default_failure_rates(),
            rounds: default_rounds(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Validates the section.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_jobs == 0 || self.min_jobs > self.max_jobs {
            return Err(ConfigError::Invalid("generator jobs must satisfy 0 < min_jobs <= max_jobs".to_string()));
        }
        if self.max_jobs > MAX_JOBS_PER_PAIR {
            return Err(ConfigError::Invalid(format!("generator.max_jobs exceeds {MAX_JOBS_PER_PAIR}")));
        }
        if self.failure_rates.is_empty() {
            return Err(ConfigError::Invalid("generator.failure_rates must not be empty".to_string()));
        }
        if self.failure_rates.iter().any(|rate| !rate.is_finite() || !(0.0 ..= 1.0).contains(rate)) {
            return Err(ConfigError::Invalid("generator.failure_rates must lie within 0.0..=1.0".to_string()));
        }
        if self.rounds == 0 {
            return Err(ConfigError::Invalid("generator.rounds must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default fewest jobs per pair.
const fn default_min_jobs() -> usize {
    6_000
}

/// Default most jobs per pair.
const fn default_max_jobs() -> usize {
    8_000
}

/// Default failure-rate choices.
fn default_failure_rates() -> Vec<f64> {
    FAILURE_RATES.to_vec()
}

/// Default rounds: the initial state plus one per transition.
fn default_rounds() -> usize {
    usize::from(NUM_STAGES) + 1
}

/// Default query catalog path.
fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog/queries.toml")
}

// ============================================================================
// SECTION: Root
// ============================================================================

/// Full benchmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Log-store settings; absent disables the backend.
    #[serde(default)]
    pub log_store: Option<LogStoreConfig>,
    /// Search-store settings; absent disables the backend.
    #[serde(default)]
    pub search_store: Option<SearchStoreConfig>,
    /// Relational-store settings; absent disables the backend.
    #[serde(default)]
    pub relational_store: Option<RelationalStoreConfig>,
    /// Time-series-store settings; absent disables the backend.
    #[serde(default)]
    pub timeseries_store: Option<TimeSeriesStoreConfig>,
    /// Duration sample sink.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Structured log sink.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Synthetic workload shape.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Query catalog location.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

impl BenchConfig {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content =
            std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text does not match the model.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first failing section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled_backends().is_empty() {
            return Err(ConfigError::Invalid("at least one backend section must be configured".to_string()));
        }
        if let Some(section) = &self.log_store {
            section.validate().map_err(|err| section_error("log_store", &err))?;
        }
        if let Some(section) = &self.search_store {
            section.validate().map_err(|err| section_error("search_store", &err))?;
        }
        if let Some(section) = &self.relational_store {
            section.validate().map_err(|err| section_error("relational_store", &err))?;
        }
        if let Some(section) = &self.timeseries_store {
            section.validate().map_err(|err| section_error("timeseries_store", &err))?;
        }
        self.metrics.validate()?;
        self.logging.validate()?;
        self.generator.validate()?;
        validate_path_string("catalog_path", &self.catalog_path.to_string_lossy())
    }

    /// Returns the configured backends in canonical order.
    #[must_use]
    pub fn enabled_backends(&self) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|backend| match backend {
                Backend::LogStore => self.log_store.is_some(),
                Backend::SearchStore => self.search_store.is_some(),
                Backend::RelationalStore => self.relational_store.is_some(),
                Backend::TimeseriesStore => self.timeseries_store.is_some(),
            })
            .collect()
    }
}

/// Prefixes a backend validation failure with its section name.
fn section_error(section: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid(format!("{section}: {err}"))
}

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Resolves the config path from argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid("config path component too long".to_string()));
    }
    Ok(())
}

/// Validates a configured path string.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed).components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, reason = "Test assertions use expect/unwrap for clarity.")]

    use std::path::Path;

    use super::ConfigError;
    use super::validate_path;

    #[test]
    fn long_path_components_are_rejected() {
        let long = "a".repeat(300);
        let err = validate_path(Path::new(&long)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("config path component too long".to_string()));
        assert!(validate_path(Path::new("configs/ingest-bench.toml")).is_ok());
    }
}
