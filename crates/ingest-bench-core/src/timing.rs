// crates/ingest-bench-core/src/timing.rs
// ============================================================================
// Module: Timing Instrument
// Description: Scoped wall-clock measurement with append-only duration samples.
// Purpose: Measure per-backend operation cost without counting failures.
// Dependencies: rand, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`TimingInstrument::time`] captures a start timestamp, runs the operation,
//! and appends exactly one [`DurationSample`] to the configured
//! [`MetricsSink`] when the operation returns `Ok`. An `Err` leaves the sink
//! untouched so failed operations never enter latency accounting.
//!
//! A sink failure is surfaced to the caller through `From<MetricsError>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Backends
// ============================================================================

/// Storage backend under measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Append-only log service.
    LogStore,
    /// Document search engine.
    SearchStore,
    /// Relational database.
    RelationalStore,
    /// Time-series database.
    TimeseriesStore,
}

impl Backend {
    /// All backends in a stable order.
    pub const ALL: [Self; 4] = [Self::LogStore, Self::SearchStore, Self::RelationalStore, Self::TimeseriesStore];

    /// Returns the stable label written to metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogStore => "log_store",
            Self::SearchStore => "search_store",
            Self::RelationalStore => "relational_store",
            Self::TimeseriesStore => "timeseries_store",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Samples
// ============================================================================

/// One timed operation.
///
/// # Invariants
/// - `end_ms >= start_ms` and `elapsed_ms == end_ms - start_ms`.
/// - Samples are append-only; nothing updates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSample {
    /// Sample identifier.
    pub record_id: String,
    /// Backend label.
    pub backend: Backend,
    /// Operation name.
    pub operation: String,
    /// Start time in epoch milliseconds.
    pub start_ms: i64,
    /// End time in epoch milliseconds.
    pub end_ms: i64,
    /// Elapsed wall-clock milliseconds.
    pub elapsed_ms: i64,
    /// Records handled by the operation, when meaningful.
    pub num_records: Option<u64>,
    /// Whether this was the first call of a repeated measurement.
    pub is_first_call: Option<bool>,
}

/// What a timing scope measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingScope {
    /// Backend under measurement.
    pub backend: Backend,
    /// Operation name.
    pub operation: String,
    /// Records handled by the operation.
    pub num_records: Option<u64>,
    /// First-call flag for repeated measurements.
    pub is_first_call: Option<bool>,
}

impl TimingScope {
    /// Creates a scope with no record count or first-call flag.
    #[must_use]
    pub fn new(backend: Backend, operation: impl Into<String>) -> Self {
        Self {
            backend,
            operation: operation.into(),
            num_records: None,
            is_first_call: None,
        }
    }

    /// Attaches a record count.
    #[must_use]
    pub fn with_records(mut self, count: usize) -> Self {
        self.num_records = u64::try_from(count).ok();
        self
    }

    /// Attaches a first-call flag.
    #[must_use]
    pub const fn with_first_call(mut self, first: bool) -> Self {
        self.is_first_call = Some(first);
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Metrics sink failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// I/O failure writing a sample.
    #[error("metrics io error: {0}")]
    Io(String),
    /// Sample could not be encoded.
    #[error("metrics encoding error: {0}")]
    Encoding(String),
    /// Remote sink rejected the sample.
    #[error("metrics backend error: {0}")]
    Backend(String),
}

/// Append-only destination for duration samples.
pub trait MetricsSink: Send + Sync {
    /// Persists one sample.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the sample cannot be persisted.
    fn append(&self, sample: &DurationSample) -> Result<(), MetricsError>;
}

/// Sink that keeps samples in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetricsSink {
    /// Recorded samples in append order.
    samples: Mutex<Vec<DurationSample>>,
}

impl InMemoryMetricsSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded samples.
    #[must_use]
    pub fn samples(&self) -> Vec<DurationSample> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn append(&self, sample: &DurationSample) -> Result<(), MetricsError> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner).push(sample.clone());
        Ok(())
    }
}

/// Sink that appends JSON lines to a file.
pub struct JsonLinesMetricsSink {
    /// File handle used for append-only writes.
    file: Mutex<std::fs::File>,
}

impl JsonLinesMetricsSink {
    /// Opens the metrics file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl MetricsSink for JsonLinesMetricsSink {
    fn append(&self, sample: &DurationSample) -> Result<(), MetricsError> {
        let payload = serde_json::to_string(sample).map_err(|err| MetricsError::Encoding(err.to_string()))?;
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{payload}").map_err(|err| MetricsError::Io(err.to_string()))?;
        file.flush().map_err(|err| MetricsError::Io(err.to_string()))
    }
}

/// Sink that discards samples.
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn append(&self, _sample: &DurationSample) -> Result<(), MetricsError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// SECTION: Instrument
// ============================================================================

/// Scoped timer writing to a metrics sink.
#[derive(Clone)]
pub struct TimingInstrument {
    /// Destination for samples.
    sink: Arc<dyn MetricsSink>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl TimingInstrument {
    /// Creates an instrument over an explicit sink and clock.
    #[must_use]
    pub fn new(sink: Arc<dyn MetricsSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink,
            clock,
        }
    }

    /// Creates an instrument using the system clock.
    #[must_use]
    pub fn with_system_clock(sink: Arc<dyn MetricsSink>) -> Self {
        Self::new(sink, Arc::new(SystemClock))
    }

    /// Returns the instrument's clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Runs `op`, recording one sample if and only if it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the operation's error unchanged, or the sink failure converted
    /// into `E` when the sample cannot be persisted.
    pub fn time<T, E, F>(&self, scope: TimingScope, op: F) -> Result<T, E>
    where
        E: From<MetricsError>,
        F: FnOnce() -> Result<T, E>,
    {
        let start_ms = self.clock.now_ms();
        let value = op()?;
        let end_ms = self.clock.now_ms().max(start_ms);
        let sample = DurationSample {
            record_id: sample_id(start_ms),
            backend: scope.backend,
            operation: scope.operation,
            start_ms,
            end_ms,
            elapsed_ms: end_ms - start_ms,
            num_records: scope.num_records,
            is_first_call: scope.is_first_call,
        };
        self.sink.append(&sample)?;
        Ok(value)
    }
}

/// Builds a sample identifier unique enough for append-only tables.
fn sample_id(start_ms: i64) -> String {
    format!("{start_ms}-{:08x}", rand::thread_rng().next_u32())
}
