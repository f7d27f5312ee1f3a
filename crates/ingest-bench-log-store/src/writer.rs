// crates/ingest-bench-log-store/src/writer.rs
// ============================================================================
// Module: Log Store Writer
// Description: Sequential, token-threaded appends with one-shot recovery.
// Purpose: Persist record batches to a log stream in submission order.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! Records are cut into sub-batches and appended one put at a time. Each put
//! carries the continuation token returned by the previous one. Failures are
//! handled in priority order:
//! - Missing stream: create it (an existing stream counts as success) and
//!   retry once.
//! - Stale token: use the token the service reported, or describe the stream
//!   when it reported none, and retry once.
//! - Anything else aborts the remaining sub-batches.
//!
//! Each put, including its single retry, is one timed `basic_write` scope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EVENT_TIME_FIELD;
use ingest_bench_core::EventLog;
use ingest_bench_core::FieldValue;
use ingest_bench_core::LogEvent;
use ingest_bench_core::Record;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_core::millis_to_datetime;
use ingest_bench_core::split_into_batches;

use crate::client::InputEvent;
use crate::client::LogStoreClient;
use crate::config::LogStoreConfig;
use crate::error::LogStoreError;

/// Component label for log events.
const COMPONENT: &str = "log_store";
/// Operation label for timed puts.
const WRITE_OPERATION: &str = "basic_write";

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Log-store write adapter.
///
/// # Invariants
/// - Sub-batches are applied strictly in submission order.
/// - The token from each successful put is threaded into the next.
pub struct LogStoreWriter {
    /// Service client.
    client: Arc<dyn LogStoreClient>,
    /// Adapter settings.
    config: LogStoreConfig,
    /// Timing instrument for puts.
    timer: TimingInstrument,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl LogStoreWriter {
    /// Creates a writer over an injected client.
    #[must_use]
    pub fn new(
        client: Arc<dyn LogStoreClient>,
        config: LogStoreConfig,
        timer: TimingInstrument,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            client,
            config,
            timer,
            log,
        }
    }

    /// Appends records to `stream`, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError`] on the first unrecoverable put; earlier
    /// sub-batches stay written.
    pub fn write_many(&self, stream: &str, records: Vec<Record>) -> Result<usize, LogStoreError> {
        let mut sequence_token: Option<String> = None;
        let mut written = 0;
        for batch in split_into_batches(records, self.config.batch_size) {
            let events = batch.into_iter().map(to_input_event).collect::<Result<Vec<_>, _>>()?;
            let scope = TimingScope::new(Backend::LogStore, WRITE_OPERATION).with_records(events.len());
            sequence_token = self.timer.time(scope, || self.put_with_recovery(stream, &events, sequence_token.as_deref()))?;
            written += events.len();
        }
        Ok(written)
    }

    /// Performs one put, recovering once from a missing stream or stale token.
    fn put_with_recovery(
        &self,
        stream: &str,
        events: &[InputEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, LogStoreError> {
        let group = self.config.log_group.as_str();
        match self.client.put_log_events(group, stream, events, sequence_token) {
            Ok(next) => Ok(next),
            Err(LogStoreError::ResourceNotFound(_)) => {
                self.log.record(
                    &LogEvent::info(COMPONENT, "log_stream_create", "creating new log stream")
                        .field("log_group", group)
                        .field("log_stream", stream),
                );
                self.ensure_stream(stream)?;
                self.client.put_log_events(group, stream, events, sequence_token)
            }
            Err(LogStoreError::InvalidSequenceToken {
                expected,
            }) => {
                self.log.record(
                    &LogEvent::warn(COMPONENT, "sequence_token_invalid", "put rejected with invalid sequence token")
                        .field("log_group", group)
                        .field("log_stream", stream)
                        .field("expected_reported", expected.is_some()),
                );
                let corrected = match expected {
                    Some(token) => Some(token),
                    None => self.describe_token(stream)?,
                };
                self.client.put_log_events(group, stream, events, corrected.as_deref())
            }
            Err(err) => {
                self.log.record(
                    &LogEvent::error(COMPONENT, "put_failed", err.to_string()).field("log_stream", stream),
                );
                Err(err)
            }
        }
    }

    /// Creates the stream, treating an existing stream as success.
    fn ensure_stream(&self, stream: &str) -> Result<(), LogStoreError> {
        match self.client.create_log_stream(&self.config.log_group, stream) {
            Ok(()) | Err(LogStoreError::ResourceAlreadyExists(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Looks up the current upload token of an exactly named stream.
    fn describe_token(&self, stream: &str) -> Result<Option<String>, LogStoreError> {
        let streams = self.client.describe_log_streams(&self.config.log_group, stream)?;
        streams.into_iter().find(|info| info.name == stream).map(|info| info.upload_sequence_token).ok_or(
            LogStoreError::InvalidSequenceToken {
                expected: None,
            },
        )
    }
}

impl RecordWriter for LogStoreWriter {
    fn backend(&self) -> Backend {
        Backend::LogStore
    }

    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError> {
        let stream = stream_name_for(self.timer.clock().now_ms());
        self.write_many(&stream, records).map_err(BackendError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a record into a log event, lifting its time field out.
///
/// # Errors
///
/// Returns [`LogStoreError::Invalid`] when the time field is missing or is
/// not a timestamp.
pub fn to_input_event(mut record: Record) -> Result<InputEvent, LogStoreError> {
    let timestamp_ms = match record.remove(EVENT_TIME_FIELD) {
        Some(FieldValue::Timestamp(ms) | FieldValue::Integer(ms)) => ms,
        Some(other) => {
            return Err(LogStoreError::Invalid(format!("{EVENT_TIME_FIELD} must be a timestamp, got {}", other.field_type().as_str())));
        }
        None => return Err(LogStoreError::Invalid(format!("record missing {EVENT_TIME_FIELD}"))),
    };
    let message = serde_json::to_string(&record.to_json()).map_err(|err| LogStoreError::Invalid(err.to_string()))?;
    Ok(InputEvent {
        timestamp_ms,
        message,
    })
}

/// Returns the per-minute stream name (`Y/M/D/H/M`, unpadded, UTC).
#[must_use]
pub fn stream_name_for(now_ms: i64) -> String {
    millis_to_datetime(now_ms).map_or_else(
        || "1970/1/1/0/0".to_string(),
        |dt| format!("{}/{}/{}/{}/{}", dt.year(), u8::from(dt.month()), dt.day(), dt.hour(), dt.minute()),
    )
}
