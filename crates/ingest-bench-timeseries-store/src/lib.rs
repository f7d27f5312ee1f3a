// crates/ingest-bench-timeseries-store/src/lib.rs
// ============================================================================
// Module: Ingest Bench Time-Series Store
// Description: Time-series write and read adapters.
// Purpose: Write multi-measure records concurrently and read them back.
// Dependencies: aws-config, aws-sdk-timestreamwrite, aws-sdk-timestreamquery, ingest-bench-core, tokio
// ============================================================================

//! ## Overview
//! [`TimeSeriesWriter`] submits tagged multi-measure records on a bounded
//! pool and logs per-record refusals without failing the call.
//! [`TimeSeriesReader`] reads query results page by page, either fully
//! materialized or lazily, optionally converting cells to native types.
//! Invariants:
//! - Refused records are logged individually and never abort a write.
//! - Paged reads skip empty pages and stop on a missing or repeated token.

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

pub use aws::TimestreamQueryClient;
pub use aws::TimestreamWriteClient;
pub use client::Cell;
pub use client::ColumnInfo;
pub use client::ColumnType;
pub use client::Dimension;
pub use client::MeasureType;
pub use client::MeasureValue;
pub use client::QueryPage;
pub use client::TimeSeriesQueryClient;
pub use client::TimeSeriesWriteClient;
pub use client::WriteRecord;
pub use config::TimeSeriesStoreConfig;
pub use error::RejectedRecord;
pub use error::TimeSeriesError;
pub use reader::SortOrder;
pub use reader::TimeSeriesPages;
pub use reader::TimeSeriesReader;
pub use reader::TypedPages;
pub use reader::TypedRow;
pub use reader::wrap_in_pagination_query;
pub use writer::TimeSeriesWriter;
pub use writer::WriteReport;
