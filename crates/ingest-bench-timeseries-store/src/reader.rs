// crates/ingest-bench-timeseries-store/src/reader.rs
// ============================================================================
// Module: Time-Series Store Reader
// Description: Materialized and lazy paged queries with typed row transform.
// Purpose: Read query results without unbounded loops or lossy typing.
// Dependencies: ingest-bench-core, serde_json, time
// ============================================================================

//! ## Overview
//! The service may return empty pages while a query is still running, so
//! [`TimeSeriesPages`] skips them and keeps following the token. It stops
//! when no token is returned or when a token repeats. Typed reads convert
//! cells using the column schema of the first page.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::client::Cell;
use crate::client::ColumnInfo;
use crate::client::ColumnType;
use crate::client::QueryPage;
use crate::client::TimeSeriesQueryClient;
use crate::config::TimeSeriesStoreConfig;
use crate::error::TimeSeriesError;

/// Component label for log events.
const COMPONENT: &str = "timeseries_store";

/// Text layout of timestamp cells.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

/// Row with native-typed values keyed by column name.
pub type TypedRow = Map<String, Value>;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Time-series read adapter.
pub struct TimeSeriesReader {
    /// Service client.
    client: Arc<dyn TimeSeriesQueryClient>,
    /// Adapter settings.
    config: TimeSeriesStoreConfig,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl TimeSeriesReader {
    /// Creates a reader over an injected client.
    #[must_use]
    pub fn new(client: Arc<dyn TimeSeriesQueryClient>, config: TimeSeriesStoreConfig, log: Arc<dyn EventLog>) -> Self {
        Self {
            client,
            config,
            log,
        }
    }

    /// Returns a lazy iterator over non-empty result pages.
    #[must_use]
    pub fn pages<'a>(&'a self, sql: &'a str) -> TimeSeriesPages<'a> {
        self.log.record(&LogEvent::info(COMPONENT, "query_started", "running query").field("page_size", self.config.page_size));
        TimeSeriesPages {
            client: self.client.as_ref(),
            sql,
            page_size: self.config.page_size,
            next_token: None,
            done: false,
        }
    }

    /// Runs a query and returns every raw row.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError`] on the first failed page.
    pub fn query(&self, sql: &str) -> Result<Vec<Vec<Cell>>, TimeSeriesError> {
        let mut rows = Vec::new();
        for page in self.pages(sql) {
            rows.extend(page?.rows);
        }
        self.log.record(&LogEvent::info(COMPONENT, "query_finished", "query drained").field("rows", rows.len()));
        Ok(rows)
    }

    /// Returns a lazy iterator over pages of typed rows.
    #[must_use]
    pub fn typed_pages<'a>(&'a self, sql: &'a str) -> TypedPages<'a> {
        TypedPages {
            pages: self.pages(sql),
            columns: None,
        }
    }

    /// Runs a query and returns every row converted to native types.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError`] on a failed page or an unconvertible cell.
    pub fn query_typed(&self, sql: &str) -> Result<Vec<TypedRow>, TimeSeriesError> {
        let mut rows = Vec::new();
        for page in self.typed_pages(sql) {
            rows.extend(page?);
        }
        Ok(rows)
    }
}

impl QueryRunner for TimeSeriesReader {
    fn backend(&self) -> Backend {
        Backend::TimeseriesStore
    }

    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError> {
        let sql = payload.as_text().ok_or_else(|| BackendError::query(Backend::TimeseriesStore, "expected SQL text"))?;
        let mut count: u64 = 0;
        for page in self.pages(sql) {
            let page = page.map_err(|err| BackendError::query(Backend::TimeseriesStore, err.to_string()))?;
            count += u64::try_from(page.rows.len()).unwrap_or(u64::MAX);
        }
        Ok(count)
    }
}

// ============================================================================
// SECTION: Iterators
// ============================================================================

/// Lazy page iterator over one query.
///
/// # Invariants
/// - Never yields an empty page.
/// - Ends after the first error, a missing token, or a repeated token.
pub struct TimeSeriesPages<'a> {
    /// Query client.
    client: &'a dyn TimeSeriesQueryClient,
    /// Query text.
    sql: &'a str,
    /// Rows per page.
    page_size: i32,
    /// Token for the next fetch.
    next_token: Option<String>,
    /// Whether iteration has ended.
    done: bool,
}

impl Iterator for TimeSeriesPages<'_> {
    type Item = Result<QueryPage, TimeSeriesError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let page = match self.client.query(self.sql, self.page_size, self.next_token.as_deref()) {
                Ok(page) => page,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            match &page.next_token {
                Some(token) if self.next_token.as_ref() != Some(token) => self.next_token = Some(token.clone()),
                _ => self.done = true,
            }
            if !page.rows.is_empty() {
                return Some(Ok(page));
            }
        }
        None
    }
}

/// Lazy iterator over pages of typed rows.
///
/// The column schema is taken from the first page that reports one.
pub struct TypedPages<'a> {
    /// Underlying raw pages.
    pages: TimeSeriesPages<'a>,
    /// Schema captured from the first page.
    columns: Option<Vec<ColumnInfo>>,
}

impl Iterator for TypedPages<'_> {
    type Item = Result<Vec<TypedRow>, TimeSeriesError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = match self.pages.next()? {
            Ok(page) => page,
            Err(err) => return Some(Err(err)),
        };
        if self.columns.is_none() && !page.columns.is_empty() {
            self.columns = Some(page.columns);
        }
        let Some(columns) = self.columns.as_deref() else {
            return Some(Err(TimeSeriesError::Invalid("result page carried no column schema".to_string())));
        };
        Some(page.rows.iter().map(|row| transform_row(columns, row)).collect())
    }
}

// ============================================================================
// SECTION: Transform
// ============================================================================

/// Converts one raw row into a typed row.
///
/// # Errors
///
/// Returns [`TimeSeriesError::Invalid`] when the row width does not match
/// the schema or a cell cannot be converted.
pub fn transform_row(columns: &[ColumnInfo], row: &[Cell]) -> Result<TypedRow, TimeSeriesError> {
    if columns.len() != row.len() {
        return Err(TimeSeriesError::Invalid(format!("row has {} cells for {} columns", row.len(), columns.len())));
    }
    columns.iter().zip(row).map(|(column, cell)| Ok((column.name.clone(), cast_cell(&column.column_type, cell)?))).collect()
}

/// Converts one cell according to its column type.
///
/// Timestamps become epoch milliseconds. Dates, times, and arrays stay text.
///
/// # Errors
///
/// Returns [`TimeSeriesError::Invalid`] when a scalar does not parse as its
/// declared type or the type is unsupported.
pub fn cast_cell(column_type: &ColumnType, cell: &Cell) -> Result<Value, TimeSeriesError> {
    let text = match cell {
        Cell::Null => return Ok(Value::Null),
        Cell::Array(items) => return Ok(Value::String(render_array(items))),
        Cell::Scalar(text) => text.as_str(),
    };
    let invalid = || TimeSeriesError::Invalid(format!("cannot read {text:?} as {column_type:?}"));
    match column_type {
        ColumnType::Varchar | ColumnType::Date | ColumnType::Time | ColumnType::Array => Ok(Value::String(text.to_string())),
        ColumnType::Integer | ColumnType::Bigint => text.parse::<i64>().map(Value::from).map_err(|_| invalid()),
        ColumnType::Double => text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number).ok_or_else(invalid),
        ColumnType::Boolean => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
        ColumnType::Timestamp => parse_timestamp_ms(text).map(Value::from).ok_or_else(invalid),
        ColumnType::Other(name) => Err(TimeSeriesError::Invalid(format!("unsupported column type {name}"))),
    }
}

/// Parses a timestamp cell into epoch milliseconds (UTC).
#[must_use]
pub fn parse_timestamp_ms(text: &str) -> Option<i64> {
    let parsed = PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT).ok()?;
    let nanos = parsed.assume_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).ok()
}

/// Renders array cells as a bracketed list.
fn render_array(items: &[Cell]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            Cell::Scalar(text) => text.clone(),
            Cell::Array(nested) => render_array(nested),
            Cell::Null => "null".to_string(),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

// ============================================================================
// SECTION: Pagination Wrapper
// ============================================================================

/// Row ordering for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Wraps a select in a row-number window selecting one offset page.
///
/// Rows `page_after + 1 ..= page_after + page_size` of the ordering are
/// returned.
#[must_use]
pub fn wrap_in_pagination_query(select: &str, page_size: u64, page_after: u64, sort_by: &str, order: SortOrder) -> String {
    let first = page_after.saturating_add(1);
    let last = page_after.saturating_add(page_size);
    format!(
        "SELECT * FROM (SELECT row_of_interest.*, ROW_NUMBER() OVER (ORDER BY row_of_interest.{sort_by} {}) AS row_num \
         FROM ({select}) AS row_of_interest) WHERE row_num BETWEEN {first} AND {last}",
        order.as_sql()
    )
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::SortOrder;
    use super::cast_cell;
    use super::parse_timestamp_ms;
    use super::wrap_in_pagination_query;
    use crate::client::Cell;
    use crate::client::ColumnType;

    #[test]
    fn nanosecond_timestamps_truncate_to_millis() {
        assert_eq!(parse_timestamp_ms("2023-11-14 22:13:20.123456789"), Some(1_700_000_000_123));
        assert_eq!(parse_timestamp_ms("2023-11-14 22:13:20.000000000"), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp_ms("not a time"), None);
    }

    #[test]
    fn scalars_cast_to_native_types() {
        let scalar = |text: &str| Cell::Scalar(text.to_string());
        assert_eq!(cast_cell(&ColumnType::Bigint, &scalar("42")).unwrap(), json!(42));
        assert_eq!(cast_cell(&ColumnType::Double, &scalar("0.5")).unwrap(), json!(0.5));
        assert_eq!(cast_cell(&ColumnType::Boolean, &scalar("true")).unwrap(), json!(true));
        assert_eq!(cast_cell(&ColumnType::Boolean, &scalar("false")).unwrap(), json!(false));
        assert_eq!(cast_cell(&ColumnType::Date, &scalar("2023-11-14")).unwrap(), json!("2023-11-14"));
        assert_eq!(cast_cell(&ColumnType::Varchar, &Cell::Null).unwrap(), Value::Null);
        assert!(cast_cell(&ColumnType::Integer, &scalar("x")).is_err());
        assert!(cast_cell(&ColumnType::Other("INTERVAL".to_string()), &scalar("1")).is_err());
    }

    #[test]
    fn pagination_wrapper_selects_one_window() {
        let sql = wrap_in_pagination_query("SELECT * FROM t", 100, 200, "time", SortOrder::Desc);
        assert!(sql.contains("ORDER BY row_of_interest.time DESC"));
        assert!(sql.contains("FROM (SELECT * FROM t) AS row_of_interest"));
        assert!(sql.ends_with("WHERE row_num BETWEEN 201 AND 300"));
    }
}
