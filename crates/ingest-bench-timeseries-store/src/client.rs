// crates/ingest-bench-timeseries-store/src/client.rs
// ============================================================================
// Module: Time-Series Client Seams
// Description: Write and query operations the adapter needs from the service.
// Purpose: Isolate the adapter from the SDK so it can be driven by fakes.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Writes carry every value as a string with an explicit type tag. Query
//! results arrive as pages of untyped cells plus column metadata.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::TimeSeriesError;

// ============================================================================
// SECTION: Write Types
// ============================================================================

/// Type tag carried alongside a measure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureType {
    /// Text.
    Varchar,
    /// 64-bit integer.
    Bigint,
    /// Floating point.
    Double,
    /// Boolean.
    Boolean,
    /// Epoch milliseconds.
    Timestamp,
}

/// Grouping attribute of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Field name.
    pub name: String,
    /// Stringified value.
    pub value: String,
}

/// Tracked value of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureValue {
    /// Field name.
    pub name: String,
    /// Stringified value.
    pub value: String,
    /// Declared type of the value.
    pub value_type: MeasureType,
}

/// One multi-measure record ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Event time in epoch milliseconds, stringified.
    pub time_ms: String,
    /// Measure group name.
    pub measure_name: String,
    /// Grouping attributes.
    pub dimensions: Vec<Dimension>,
    /// Tracked values.
    pub measures: Vec<MeasureValue>,
}

// ============================================================================
// SECTION: Query Types
// ============================================================================

/// Declared type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Text.
    Varchar,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Bigint,
    /// Floating point.
    Double,
    /// Boolean.
    Boolean,
    /// Date-time with nanosecond text precision.
    Timestamp,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Array of values.
    Array,
    /// Any type the adapter does not convert.
    Other(String),
}

/// Name and type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
}

/// Raw result cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Scalar rendered as text.
    Scalar(String),
    /// Array of nested cells.
    Array(Vec<Self>),
    /// SQL null.
    Null,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPage {
    /// Column metadata.
    pub columns: Vec<ColumnInfo>,
    /// Rows of cells in column order.
    pub rows: Vec<Vec<Cell>>,
    /// Token for the next page, if any.
    pub next_token: Option<String>,
}

// ============================================================================
// SECTION: Seams
// ============================================================================

/// Write operations against a time-series table.
pub trait TimeSeriesWriteClient: Send + Sync {
    /// Submits one batch of records.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Rejected`] when the service refused some
    /// records and [`TimeSeriesError::Service`] on any other failure.
    fn write_records(&self, database: &str, table: &str, records: &[WriteRecord]) -> Result<(), TimeSeriesError>;
}

/// Query operations against the time-series service.
pub trait TimeSeriesQueryClient: Send + Sync {
    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Service`] on failure.
    fn query(&self, sql: &str, page_size: i32, next_token: Option<&str>) -> Result<QueryPage, TimeSeriesError>;
}
