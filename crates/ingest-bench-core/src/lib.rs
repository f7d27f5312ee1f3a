// crates/ingest-bench-core/src/lib.rs
// ============================================================================
// Module: Ingest Bench Core
// Description: Shared record model, job state machine, and write utilities.
// Purpose: Provide the backend-agnostic building blocks used by every adapter.
// Dependencies: rand, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! This crate holds everything the storage adapters share: the flat
//! [`Record`] model and its schema, the synthetic [`IngestionJob`] state
//! machine, the batch splitter and bounded worker pool, retry policies, the
//! [`TimingInstrument`], structured event logging, and the query catalog.
//! Invariants:
//! - A timed scope records exactly one sample on success and none on failure.
//! - Job stages never decrease; errored jobs never transition again.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod batching;
pub mod catalog;
pub mod job;
pub mod logging;
pub mod record;
pub mod retry;
pub mod timing;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::BackendError;
pub use backend::QueryRunner;
pub use backend::RecordWriter;
pub use batching::PoolFailure;
pub use batching::run_bounded;
pub use batching::split_into_batches;
pub use catalog::BackendQueries;
pub use catalog::QueryCatalog;
pub use catalog::QueryPayload;
pub use catalog::QueryShape;
pub use job::IngestionBatch;
pub use job::IngestionJob;
pub use job::IngestionStage;
pub use job::generate_batch_pair;
pub use job::generate_jobs;
pub use logging::EventLog;
pub use logging::FileEventLog;
pub use logging::LogEvent;
pub use logging::LogLevel;
pub use logging::MemoryEventLog;
pub use logging::NoopEventLog;
pub use logging::StderrEventLog;
pub use record::EVENT_TIME_FIELD;
pub use record::FieldSpec;
pub use record::FieldType;
pub use record::FieldValue;
pub use record::Record;
pub use record::RecordSchema;
pub use record::ingestion_event_schema;
pub use record::millis_to_datetime;
pub use retry::Backoff;
pub use retry::BackoffPolicy;
pub use retry::Cooldown;
pub use timing::Backend;
pub use timing::Clock;
pub use timing::DurationSample;
pub use timing::InMemoryMetricsSink;
pub use timing::JsonLinesMetricsSink;
pub use timing::MetricsError;
pub use timing::MetricsSink;
pub use timing::NoopMetricsSink;
pub use timing::SystemClock;
pub use timing::TimingInstrument;
pub use timing::TimingScope;
