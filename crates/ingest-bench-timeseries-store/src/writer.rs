// crates/ingest-bench-timeseries-store/src/writer.rs
// ============================================================================
// Module: Time-Series Store Writer
// Description: Concurrent multi-measure writes with reject-and-continue.
// Purpose: Persist record batches while tolerating per-record refusals.
// Dependencies: ingest-bench-core
// ============================================================================

//! ## Overview
//! Records are converted into multi-measure records whose values are all
//! strings with explicit type tags, cut into sub-batches, and submitted on a
//! bounded pool. A request the service partly refuses is not an error: each
//! refused record is logged with its index and reason and the write goes on.
//! Any other failure aborts the call. The whole call is one timed
//! `basic_write` scope carrying the total record count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EventLog;
use ingest_bench_core::FieldType;
use ingest_bench_core::FieldValue;
use ingest_bench_core::LogEvent;
use ingest_bench_core::Record;
use ingest_bench_core::RecordSchema;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_core::run_bounded;
use ingest_bench_core::split_into_batches;

use crate::client::Dimension;
use crate::client::MeasureType;
use crate::client::MeasureValue;
use crate::client::TimeSeriesWriteClient;
use crate::client::WriteRecord;
use crate::config::TimeSeriesStoreConfig;
use crate::error::TimeSeriesError;

/// Component label for log events.
const COMPONENT: &str = "timeseries_store";
/// Operation label for timed writes.
const WRITE_OPERATION: &str = "basic_write";

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of one write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteReport {
    /// Records submitted.
    pub submitted: usize,
    /// Records the service refused.
    pub rejected: usize,
    /// Requests sent.
    pub requests: usize,
}

impl WriteReport {
    /// Returns the number of records the service accepted.
    #[must_use]
    pub const fn accepted(&self) -> usize {
        self.submitted.saturating_sub(self.rejected)
    }
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Time-series write adapter.
///
/// # Invariants
/// - Refused records never fail the call.
/// - Sub-batches carry no ordering guarantee relative to each other.
pub struct TimeSeriesWriter {
    /// Service client.
    client: Arc<dyn TimeSeriesWriteClient>,
    /// Adapter settings.
    config: TimeSeriesStoreConfig,
    /// Declared field types used for type tags.
    schema: RecordSchema,
    /// Timing instrument for writes.
    timer: TimingInstrument,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl TimeSeriesWriter {
    /// Creates a writer over an injected client.
    #[must_use]
    pub fn new(
        client: Arc<dyn TimeSeriesWriteClient>,
        config: TimeSeriesStoreConfig,
        schema: RecordSchema,
        timer: TimingInstrument,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            client,
            config,
            schema,
            timer,
            log,
        }
    }

    /// Writes records, returning how many were submitted and refused.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Invalid`] when a record cannot be converted
    /// and the first non-rejection failure of any request otherwise.
    pub fn write_records(&self, records: Vec<Record>) -> Result<WriteReport, TimeSeriesError> {
        if records.is_empty() {
            return Ok(WriteReport::default());
        }
        let submitted = records.len();
        let prepared = records.iter().map(|record| self.prepare(record)).collect::<Result<Vec<_>, _>>()?;
        self.log.record(
            &LogEvent::info(COMPONENT, "write_started", "writing records")
                .field("database", self.config.database.as_str())
                .field("table", self.config.table.as_str())
                .field("records", submitted),
        );
        let batches = split_into_batches(prepared, self.config.batch_size);
        let requests = batches.len();
        let scope = TimingScope::new(Backend::TimeseriesStore, WRITE_OPERATION).with_records(submitted);
        let rejected = self.timer.time(scope, || {
            let counts = run_bounded(batches, self.config.workers, |batch| self.submit(&batch)).map_err(|failure| {
                for err in &failure.additional {
                    self.log.record(&LogEvent::error(COMPONENT, "write_worker_failed", err.to_string()));
                }
                failure.first
            })?;
            Ok::<usize, TimeSeriesError>(counts.into_iter().sum())
        })?;
        Ok(WriteReport {
            submitted,
            rejected,
            requests,
        })
    }

    /// Submits one request, logging refused records instead of failing.
    fn submit(&self, batch: &[WriteRecord]) -> Result<usize, TimeSeriesError> {
        match self.client.write_records(&self.config.database, &self.config.table, batch) {
            Ok(()) => Ok(0),
            Err(TimeSeriesError::Rejected(rejected)) => {
                for record in &rejected {
                    self.log.record(
                        &LogEvent::warn(COMPONENT, "record_rejected", record.reason.as_str())
                            .field("record_index", record.index)
                            .field("table", self.config.table.as_str()),
                    );
                }
                Ok(rejected.len())
            }
            Err(err) => {
                self.log.record(&LogEvent::error(COMPONENT, "write_failed", err.to_string()));
                Err(err)
            }
        }
    }

    /// Converts one record into a tagged multi-measure record.
    fn prepare(&self, record: &Record) -> Result<WriteRecord, TimeSeriesError> {
        let time_field = self.config.time_field.as_str();
        let time_ms = match record.get(time_field) {
            Some(FieldValue::Timestamp(ms) | FieldValue::Integer(ms)) => ms.to_string(),
            Some(other) => {
                return Err(TimeSeriesError::Invalid(format!(
                    "{time_field} must be a timestamp, got {}",
                    other.field_type().as_str()
                )));
            }
            None => return Err(TimeSeriesError::Invalid(format!("record missing {time_field}"))),
        };
        let dimensions = self
            .config
            .dimensions
            .iter()
            .filter_map(|name| {
                record.get(name).map(|value| Dimension {
                    name: name.clone(),
                    value: value.to_string(),
                })
            })
            .collect();
        let measures = self
            .config
            .measures
            .iter()
            .filter_map(|name| {
                record.get(name).map(|value| MeasureValue {
                    name: name.clone(),
                    value: value.to_string(),
                    value_type: self.measure_type(name, value),
                })
            })
            .collect::<Vec<_>>();
        if measures.is_empty() {
            return Err(TimeSeriesError::Invalid("record carries no measure fields".to_string()));
        }
        Ok(WriteRecord {
            time_ms,
            measure_name: self.config.measure_name.clone(),
            dimensions,
            measures,
        })
    }

    /// Resolves the type tag for a measure.
    fn measure_type(&self, name: &str, value: &FieldValue) -> MeasureType {
        if self.config.string_fields.iter().any(|field| field == name) {
            return MeasureType::Varchar;
        }
        match self.schema.field_type(name).unwrap_or_else(|| value.field_type()) {
            FieldType::Text => MeasureType::Varchar,
            FieldType::Integer => MeasureType::Bigint,
            FieldType::Double => MeasureType::Double,
            FieldType::Boolean => MeasureType::Boolean,
            FieldType::Timestamp => MeasureType::Timestamp,
        }
    }
}

impl RecordWriter for TimeSeriesWriter {
    fn backend(&self) -> Backend {
        Backend::TimeseriesStore
    }

    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError> {
        let report = self.write_records(records).map_err(BackendError::from)?;
        Ok(report.accepted())
    }
}
