// crates/ingest-bench-timeseries-store/tests/timeseries_reader_unit.rs
// ============================================================================
// Module: Time-Series Reader Tests
// Description: Paging termination, laziness, and typed row conversion.
// Purpose: Confirm reads skip empty pages and never loop on a stuck token.
// ============================================================================

//! Time-series reader unit tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use ingest_bench_core::MemoryEventLog;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;
use ingest_bench_timeseries_store::ColumnType;
use ingest_bench_timeseries_store::QueryPage;
use ingest_bench_timeseries_store::TimeSeriesError;
use ingest_bench_timeseries_store::TimeSeriesReader;
use serde_json::json;

use crate::common::FakeQueryClient;
use crate::common::config;
use crate::common::page;

/// Columns shared by the fixtures.
const COLUMNS: [(&str, ColumnType); 4] = [
    ("job_id", ColumnType::Varchar),
    ("stage_progress", ColumnType::Bigint),
    ("time", ColumnType::Timestamp),
    ("finished", ColumnType::Boolean),
];

/// Builds a reader over `client`.
fn reader(client: Arc<FakeQueryClient>) -> TimeSeriesReader {
    TimeSeriesReader::new(client, config(), Arc::new(MemoryEventLog::new()))
}

/// Builds a fixture page with `rows` and an optional token.
fn rows_page(rows: &[&[&str]], next_token: Option<&str>) -> Result<QueryPage, TimeSeriesError> {
    Ok(page(&COLUMNS, rows, next_token))
}

#[test]
fn materialized_read_skips_empty_pages_until_token_ends() {
    let client = FakeQueryClient::with_pages(vec![
        rows_page(&[], Some("t1")),
        rows_page(&[&["a", "1", "2023-11-14 22:13:20.000000000", "false"], &["b", "2", "2023-11-14 22:13:21.000000000", "false"]], Some("t2")),
        rows_page(&[&["c", "6", "2023-11-14 22:13:22.000000000", "true"]], None),
    ]);
    let reader = reader(client.clone());

    let rows = reader.query("SELECT * FROM bench.monitoring_events").unwrap();

    assert_eq!(rows.len(), 3);
    let tokens: Vec<Option<String>> = client.calls().into_iter().map(|call| call.next_token).collect();
    assert_eq!(tokens, vec![None, Some("t1".to_string()), Some("t2".to_string())]);
    assert!(client.calls().iter().all(|call| call.page_size == 2));
}

#[test]
fn repeated_token_stops_paging() {
    let client = FakeQueryClient::with_pages(vec![
        rows_page(&[&["a", "1", "2023-11-14 22:13:20.000000000", "false"]], Some("t1")),
        rows_page(&[&["b", "2", "2023-11-14 22:13:21.000000000", "false"]], Some("t1")),
        rows_page(&[&["c", "3", "2023-11-14 22:13:22.000000000", "false"]], None),
    ]);
    let reader = reader(client.clone());

    let rows = reader.query("SELECT 1").unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(client.calls().len(), 2);
}

#[test]
fn lazy_pages_fetch_on_demand() {
    let client = FakeQueryClient::with_pages(vec![
        rows_page(&[&["a", "1", "2023-11-14 22:13:20.000000000", "false"]], Some("t1")),
        rows_page(&[&["b", "2", "2023-11-14 22:13:21.000000000", "false"]], None),
    ]);
    let reader = reader(client.clone());

    let mut pages = reader.pages("SELECT 1");
    let first = pages.next().unwrap().unwrap();

    assert_eq!(first.rows.len(), 1);
    assert_eq!(client.calls().len(), 1);
    assert!(pages.next().unwrap().is_ok());
    assert!(pages.next().is_none());
    assert_eq!(client.calls().len(), 2);
}

#[test]
fn typed_rows_use_first_page_schema() {
    let second = page(&[], &[&["b", "2", "2023-11-14 22:13:21.500000000", "true"]], None);
    let client = FakeQueryClient::with_pages(vec![
        rows_page(&[&["a", "1", "2023-11-14 22:13:20.123456789", "false"]], Some("t1")),
        Ok(second),
    ]);
    let reader = reader(client);

    let rows = reader.query_typed("SELECT 1").unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("job_id"), Some(&json!("a")));
    assert_eq!(rows[0].get("stage_progress"), Some(&json!(1)));
    assert_eq!(rows[0].get("time"), Some(&json!(1_700_000_000_123_i64)));
    assert_eq!(rows[0].get("finished"), Some(&json!(false)));
    assert_eq!(rows[1].get("time"), Some(&json!(1_700_000_001_500_i64)));
    assert_eq!(rows[1].get("finished"), Some(&json!(true)));
}

#[test]
fn service_error_ends_iteration() {
    let client = FakeQueryClient::with_pages(vec![Err(TimeSeriesError::Service("query cancelled".to_string()))]);
    let reader = reader(client.clone());

    let mut pages = reader.pages("SELECT 1");
    assert!(matches!(pages.next(), Some(Err(TimeSeriesError::Service(_)))));
    assert!(pages.next().is_none());
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn runner_counts_rows_and_requires_sql() {
    let client = FakeQueryClient::with_pages(vec![
        rows_page(&[&["a", "1", "2023-11-14 22:13:20.000000000", "false"], &["b", "2", "2023-11-14 22:13:21.000000000", "false"]], Some("t1")),
        rows_page(&[&["c", "3", "2023-11-14 22:13:22.000000000", "false"]], None),
    ]);
    let reader = reader(client);

    assert_eq!(reader.run(&QueryPayload::Text("SELECT 1".to_string())).unwrap(), 3);
    assert!(reader.run(&QueryPayload::Json(json!({}))).is_err());
}
