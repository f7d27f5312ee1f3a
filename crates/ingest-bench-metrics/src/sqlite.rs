// crates/ingest-bench-metrics/src/sqlite.rs
// ============================================================================
// Module: SQLite Metrics Sink
// Description: Append-only duration samples in a local SQLite database.
// Purpose: Persist benchmark timings durably without a cloud dependency.
// Dependencies: ingest-bench-core, rusqlite, serde
// ============================================================================

//! ## Overview
//! [`SqliteMetricsSink`] stores one row per [`DurationSample`] in the
//! `duration_samples` table. Rows are only ever inserted. A duplicate sample
//! identifier is an error rather than an overwrite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use ingest_bench_core::Backend;
use ingest_bench_core::DurationSample;
use ingest_bench_core::MetricsError;
use ingest_bench_core::MetricsSink;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;

use crate::error::MetricsStoreError;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Write-ahead log.
    #[default]
    Wal,
    /// Rollback journal.
    Delete,
}

impl JournalMode {
    /// Returns the pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` metrics sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteMetricsConfig {
    /// Database file path.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode.
    #[serde(default)]
    pub journal_mode: JournalMode,
}

impl SqliteMetricsConfig {
    /// Creates settings with defaults for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
        }
    }
}

/// Default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Durable sink over a single `SQLite` connection.
pub struct SqliteMetricsSink {
    /// Serialized connection.
    connection: Mutex<Connection>,
}

impl SqliteMetricsSink {
    /// Opens (creating if needed) the database and its table.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsStoreError`] when the path is a directory or the
    /// database cannot be opened or initialized.
    pub fn open(config: &SqliteMetricsConfig) -> Result<Self, MetricsStoreError> {
        if config.path.is_dir() {
            return Err(MetricsStoreError::Invalid("metrics path must be a file, not a directory".to_string()));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags)?;
        connection.execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
        connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Self::initialize(connection)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsStoreError`] when the table cannot be created.
    pub fn in_memory() -> Result<Self, MetricsStoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    /// Creates the sample table.
    fn initialize(connection: Connection) -> Result<Self, MetricsStoreError> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS duration_samples (
                record_id TEXT PRIMARY KEY,
                backend TEXT NOT NULL,
                operation TEXT NOT NULL,
                start_ms INTEGER NOT NULL,
                end_ms INTEGER NOT NULL,
                elapsed_ms INTEGER NOT NULL,
                num_records INTEGER,
                is_first_call INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_duration_samples_operation
                ON duration_samples (backend, operation);",
        )?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Reads every stored sample in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsStoreError`] on a query failure or an unknown
    /// backend label.
    pub fn samples(&self) -> Result<Vec<DurationSample>, MetricsStoreError> {
        let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut statement = connection.prepare(
            "SELECT record_id, backend, operation, start_ms, end_ms, elapsed_ms, num_records, is_first_call
             FROM duration_samples ORDER BY rowid",
        )?;
        let rows = statement.query_map(params![], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, Option<i64>>(6)?,
                row.get::<_, Option<bool>>(7)?,
            ))
        })?;
        let mut samples = Vec::new();
        for row in rows {
            let (record_id, backend, operation, start_ms, end_ms, elapsed_ms, num_records, is_first_call) = row?;
            let backend = backend_from_label(&backend)
                .ok_or_else(|| MetricsStoreError::Invalid(format!("unknown backend label {backend}")))?;
            samples.push(DurationSample {
                record_id,
                backend,
                operation,
                start_ms,
                end_ms,
                elapsed_ms,
                num_records: num_records.and_then(|count| u64::try_from(count).ok()),
                is_first_call,
            });
        }
        Ok(samples)
    }
}

impl MetricsSink for SqliteMetricsSink {
    fn append(&self, sample: &DurationSample) -> Result<(), MetricsError> {
        let num_records = sample
            .num_records
            .map(i64::try_from)
            .transpose()
            .map_err(|_| MetricsError::Encoding("num_records exceeds i64".to_string()))?;
        let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        connection
            .execute(
                "INSERT INTO duration_samples
                 (record_id, backend, operation, start_ms, end_ms, elapsed_ms, num_records, is_first_call)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    sample.record_id,
                    sample.backend.as_str(),
                    sample.operation,
                    sample.start_ms,
                    sample.end_ms,
                    sample.elapsed_ms,
                    num_records,
                    sample.is_first_call,
                ],
            )
            .map_err(|err| MetricsError::Io(err.to_string()))?;
        Ok(())
    }
}

/// Resolves a stored backend label.
#[must_use]
pub fn backend_from_label(label: &str) -> Option<Backend> {
    Backend::ALL.into_iter().find(|backend| backend.as_str() == label)
}
