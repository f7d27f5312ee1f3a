// crates/ingest-bench-cli/src/wiring.rs
// ============================================================================
// Module: Backend Wiring
// Description: Builds adapters, metrics sinks, and the event log from config.
// Purpose: Create each long-lived client once and inject it into its adapters.
// Dependencies: ingest-bench-*, thiserror
// ============================================================================

//! ## Overview
//! Every enabled backend gets one client shared by its writer and its query
//! runner. A backend whose client cannot be created is logged and left out;
//! the run proceeds with the rest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ingest_bench_config::BenchConfig;
use ingest_bench_config::LogSinkKind;
use ingest_bench_config::LoggingConfig;
use ingest_bench_config::MetricsConfig;
use ingest_bench_config::MetricsSinkKind;
use ingest_bench_core::Backend;
use ingest_bench_core::Clock;
use ingest_bench_core::DurationSample;
use ingest_bench_core::EventLog;
use ingest_bench_core::FileEventLog;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::JsonLinesMetricsSink;
use ingest_bench_core::LogEvent;
use ingest_bench_core::MetricsSink;
use ingest_bench_core::NoopEventLog;
use ingest_bench_core::QueryRunner;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::StderrEventLog;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::ingestion_event_schema;
use ingest_bench_log_store::CloudWatchLogsClient;
use ingest_bench_log_store::LogStoreClient;
use ingest_bench_log_store::LogStoreConfig;
use ingest_bench_log_store::LogStoreReader;
use ingest_bench_log_store::LogStoreWriter;
use ingest_bench_metrics::DynamoDbMetricsSink;
use ingest_bench_metrics::SqliteMetricsSink;
use ingest_bench_relational_store::RelationalStoreConfig;
use ingest_bench_relational_store::RelationalStoreReader;
use ingest_bench_relational_store::RelationalStoreWriter;
use ingest_bench_relational_store::open_connection;
use ingest_bench_search_store::HttpSearchTransport;
use ingest_bench_search_store::SearchStoreConfig;
use ingest_bench_search_store::SearchStoreReader;
use ingest_bench_search_store::SearchStoreWriter;
use ingest_bench_search_store::SearchTransport;
use ingest_bench_timeseries_store::TimeSeriesQueryClient;
use ingest_bench_timeseries_store::TimeSeriesReader;
use ingest_bench_timeseries_store::TimeSeriesStoreConfig;
use ingest_bench_timeseries_store::TimeSeriesWriteClient;
use ingest_bench_timeseries_store::TimeSeriesWriter;
use ingest_bench_timeseries_store::TimestreamQueryClient;
use ingest_bench_timeseries_store::TimestreamWriteClient;
use thiserror::Error;

use crate::driver::BenchTargets;
use crate::driver::Driver;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that prevent a run from starting.
#[derive(Debug, Error)]
pub enum WiringError {
    /// The event log could not be opened.
    #[error("event log unavailable: {0}")]
    EventLog(String),
    /// The metrics sink could not be opened or read.
    #[error("metrics sink unavailable: {0}")]
    Metrics(String),
    /// Every configured backend failed to initialize.
    #[error("no configured backend could be initialized")]
    NoBackends,
}

// ============================================================================
// SECTION: Sample Access
// ============================================================================

/// Read-back handle for sinks that can list their samples.
pub enum SampleSource {
    /// In-process samples.
    Memory(Arc<InMemoryMetricsSink>),
    /// Samples in a local `SQLite` database.
    Sqlite(Arc<SqliteMetricsSink>),
    /// Samples live elsewhere and are not read back.
    External,
}

impl SampleSource {
    /// Returns every stored sample, or `None` for external sinks.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Metrics`] when the `SQLite` read fails.
    pub fn samples(&self) -> Result<Option<Vec<DurationSample>>, WiringError> {
        match self {
            Self::Memory(sink) => Ok(Some(sink.samples())),
            Self::Sqlite(sink) => sink.samples().map(Some).map_err(|err| WiringError::Metrics(err.to_string())),
            Self::External => Ok(None),
        }
    }
}

/// A fully wired benchmark.
pub struct Bench {
    /// Driver over the initialized backends.
    pub driver: Driver,
    /// Sample read-back for summaries.
    pub samples: SampleSource,
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds the event log, metrics sink, and every enabled backend.
///
/// # Errors
///
/// Returns [`WiringError`] when a sink cannot be opened or no backend
/// initializes.
pub fn build_bench(config: &BenchConfig) -> Result<Bench, WiringError> {
    let log = build_event_log(&config.logging)?;
    let (sink, samples) = build_metrics_sink(&config.metrics)?;
    let timer = TimingInstrument::new(sink, Arc::new(SystemClock));
    let targets = build_targets(config, &timer, &log);
    if targets.is_empty() {
        return Err(WiringError::NoBackends);
    }
    Ok(Bench {
        driver: Driver::new(targets, timer, log),
        samples,
    })
}

/// Opens the configured event log.
///
/// # Errors
///
/// Returns [`WiringError::EventLog`] when the log file cannot be opened.
pub fn build_event_log(config: &LoggingConfig) -> Result<Arc<dyn EventLog>, WiringError> {
    match (config.sink, &config.path) {
        (LogSinkKind::Stderr, _) => Ok(Arc::new(StderrEventLog)),
        (LogSinkKind::None, _) => Ok(Arc::new(NoopEventLog)),
        (LogSinkKind::File, Some(path)) => {
            ensure_parent_dir(path).map_err(WiringError::EventLog)?;
            let log = FileEventLog::new(path).map_err(|err| WiringError::EventLog(err.to_string()))?;
            Ok(Arc::new(log))
        }
        (LogSinkKind::File, None) => Err(WiringError::EventLog("logging.path is not set".to_string())),
    }
}

/// Opens the configured metrics sink with its read-back handle.
///
/// # Errors
///
/// Returns [`WiringError::Metrics`] when the sink cannot be opened.
pub fn build_metrics_sink(config: &MetricsConfig) -> Result<(Arc<dyn MetricsSink>, SampleSource), WiringError> {
    let missing = |field: &str| WiringError::Metrics(format!("metrics.{field} is not set"));
    match config.sink {
        MetricsSinkKind::Memory => {
            let sink = Arc::new(InMemoryMetricsSink::new());
            Ok((Arc::clone(&sink) as Arc<dyn MetricsSink>, SampleSource::Memory(sink)))
        }
        MetricsSinkKind::JsonLines => {
            let path = config.path.as_deref().ok_or_else(|| missing("path"))?;
            ensure_parent_dir(path).map_err(WiringError::Metrics)?;
            let sink = JsonLinesMetricsSink::new(path).map_err(|err| WiringError::Metrics(err.to_string()))?;
            Ok((Arc::new(sink), SampleSource::External))
        }
        MetricsSinkKind::Sqlite => {
            let settings = config.sqlite().ok_or_else(|| missing("path"))?;
            ensure_parent_dir(&settings.path).map_err(WiringError::Metrics)?;
            let sink = Arc::new(SqliteMetricsSink::open(&settings).map_err(|err| WiringError::Metrics(err.to_string()))?);
            Ok((Arc::clone(&sink) as Arc<dyn MetricsSink>, SampleSource::Sqlite(sink)))
        }
        MetricsSinkKind::Dynamodb => {
            let settings = config.dynamodb().ok_or_else(|| missing("table"))?;
            let sink = DynamoDbMetricsSink::connect(&settings).map_err(|err| WiringError::Metrics(err.to_string()))?;
            Ok((Arc::new(sink), SampleSource::External))
        }
    }
}

/// Builds adapters for every enabled backend, skipping those that fail.
#[must_use]
pub fn build_targets(config: &BenchConfig, timer: &TimingInstrument, log: &Arc<dyn EventLog>) -> BenchTargets {
    let mut targets = BenchTargets::new();
    let mut attach = |backend: Backend, built: Result<AdapterPair, String>| match built {
        Ok((writer, runner)) => {
            targets.push_writer(writer);
            targets.push_runner(runner);
        }
        Err(message) => {
            log.record(&LogEvent::error("wiring", "backend_unavailable", message).field("backend", backend.as_str()));
        }
    };
    if let Some(section) = &config.log_store {
        attach(Backend::LogStore, log_store(section, timer, log));
    }
    if let Some(section) = &config.search_store {
        attach(Backend::SearchStore, search_store(section, timer, log));
    }
    if let Some(section) = &config.relational_store {
        attach(Backend::RelationalStore, relational_store(section, timer, log));
    }
    if let Some(section) = &config.timeseries_store {
        attach(Backend::TimeseriesStore, timeseries_store(section, timer, log));
    }
    targets
}

/// Adapter pair for one backend.
type AdapterPair = (Box<dyn RecordWriter>, Box<dyn QueryRunner>);

/// Builds the log-store adapters over one `CloudWatch` Logs client.
fn log_store(config: &LogStoreConfig, timer: &TimingInstrument, log: &Arc<dyn EventLog>) -> Result<AdapterPair, String> {
    let client: Arc<dyn LogStoreClient> = Arc::new(CloudWatchLogsClient::new(config).map_err(|err| err.to_string())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let writer = LogStoreWriter::new(Arc::clone(&client), config.clone(), timer.clone(), Arc::clone(log));
    let reader = LogStoreReader::new(client, config.clone(), clock, Arc::clone(log));
    Ok((Box::new(writer), Box::new(reader)))
}

/// Builds the search-store adapters over one HTTP transport.
fn search_store(
    config: &SearchStoreConfig,
    timer: &TimingInstrument,
    log: &Arc<dyn EventLog>,
) -> Result<AdapterPair, String> {
    let transport: Arc<dyn SearchTransport> =
        Arc::new(HttpSearchTransport::new(config).map_err(|err| err.to_string())?);
    let writer = SearchStoreWriter::new(Arc::clone(&transport), config.clone(), timer.clone(), Arc::clone(log));
    let reader = SearchStoreReader::new(transport, config.clone(), Arc::clone(log));
    Ok((Box::new(writer), Box::new(reader)))
}

/// Builds the relational adapters over one shared connection.
fn relational_store(
    config: &RelationalStoreConfig,
    timer: &TimingInstrument,
    log: &Arc<dyn EventLog>,
) -> Result<AdapterPair, String> {
    let connection = open_connection(config).map_err(|err| err.to_string())?;
    let writer = RelationalStoreWriter::new(
        Arc::clone(&connection),
        config.clone(),
        ingestion_event_schema(),
        timer.clone(),
        Arc::clone(log),
    );
    let reader = RelationalStoreReader::new(connection, config.clone());
    Ok((Box::new(writer), Box::new(reader)))
}

/// Builds the time-series adapters over dedicated write and query clients.
fn timeseries_store(
    config: &TimeSeriesStoreConfig,
    timer: &TimingInstrument,
    log: &Arc<dyn EventLog>,
) -> Result<AdapterPair, String> {
    let write_client: Arc<dyn TimeSeriesWriteClient> =
        Arc::new(TimestreamWriteClient::new(config).map_err(|err| err.to_string())?);
    let query_client: Arc<dyn TimeSeriesQueryClient> =
        Arc::new(TimestreamQueryClient::new(config).map_err(|err| err.to_string())?);
    let writer =
        TimeSeriesWriter::new(write_client, config.clone(), ingestion_event_schema(), timer.clone(), Arc::clone(log));
    let reader = TimeSeriesReader::new(query_client, config.clone(), Arc::clone(log));
    Ok((Box::new(writer), Box::new(reader)))
}

/// Creates the parent directory of an output file.
fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| format!("{}: {err}", parent.display()))
        }
        _ => Ok(()),
    }
}
