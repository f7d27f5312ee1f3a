// crates/ingest-bench-config/src/lib.rs
// ============================================================================
// Module: Ingest Bench Config
// Description: Benchmark configuration and query catalog loading.
// Purpose: Validate everything a run needs before any backend is touched.
// Dependencies: ingest-bench-*, serde, toml
// ============================================================================

//! ## Overview
//! [`BenchConfig`] collects the per-backend settings, the metrics and
//! logging sinks, and the workload generator. [`load_catalog`] reads the
//! five canonical query shapes. Both fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::load_catalog;
pub use catalog::parse_catalog;
pub use config::BenchConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::GeneratorConfig;
pub use config::LogSinkKind;
pub use config::LoggingConfig;
pub use config::MAX_JOBS_PER_PAIR;
pub use config::MetricsConfig;
pub use config::MetricsSinkKind;
