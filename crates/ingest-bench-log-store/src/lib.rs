// crates/ingest-bench-log-store/src/lib.rs
// ============================================================================
// Module: Ingest Bench Log Store
// Description: Log-store write and read adapters.
// Purpose: Append record batches to log streams and read them back.
// Dependencies: aws-config, aws-sdk-cloudwatchlogs, ingest-bench-core, tokio
// ============================================================================

//! ## Overview
//! The log store accepts ordered appends guarded by a continuation token.
//! [`LogStoreWriter`] threads that token through sequential sub-batch puts
//! and recovers once from a missing stream or a stale token.
//! [`LogStoreReader`] pages streams, filters them, and runs Insights queries.
//! Invariants:
//! - Writes to one stream are strictly sequential.
//! - Paged reads terminate on an empty page or a non-advancing cursor.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aws;
pub mod client;
pub mod config;
pub mod error;
pub mod reader;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aws::CloudWatchLogsClient;
pub use client::EventsPage;
pub use client::FilterPage;
pub use client::InputEvent;
pub use client::LogStoreClient;
pub use client::OutputEvent;
pub use client::PageDirection;
pub use client::QueryRequest;
pub use client::QueryResults;
pub use client::QueryRow;
pub use client::QueryState;
pub use client::StreamInfo;
pub use config::LogStoreConfig;
pub use error::LogStoreError;
pub use reader::LogPage;
pub use reader::LogStoreReader;
pub use reader::SearchPage;
pub use writer::LogStoreWriter;
pub use writer::stream_name_for;
pub use writer::to_input_event;
