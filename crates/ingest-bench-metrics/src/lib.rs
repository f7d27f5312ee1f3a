// crates/ingest-bench-metrics/src/lib.rs
// ============================================================================
// Module: Ingest Bench Metrics
// Description: Durable metrics sinks and sample summaries.
// Purpose: Persist every timed operation and condense the results.
// Dependencies: aws-sdk-dynamodb, ingest-bench-core, rusqlite
// ============================================================================

//! ## Overview
//! Two append-only [`MetricsSink`](ingest_bench_core::MetricsSink)
//! implementations: [`SqliteMetricsSink`] for local runs and
//! [`DynamoDbMetricsSink`] for shared tables. [`summarize`] groups samples
//! per backend operation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dynamodb;
pub mod error;
pub mod sqlite;
pub mod summary;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dynamodb::DynamoDbItemStore;
pub use dynamodb::DynamoDbMetricsConfig;
pub use dynamodb::DynamoDbMetricsSink;
pub use dynamodb::Item;
pub use dynamodb::ItemStore;
pub use dynamodb::ItemValue;
pub use dynamodb::sample_item;
pub use error::MetricsStoreError;
pub use sqlite::JournalMode;
pub use sqlite::SqliteMetricsConfig;
pub use sqlite::SqliteMetricsSink;
pub use sqlite::backend_from_label;
pub use summary::OperationSummary;
pub use summary::summarize;
