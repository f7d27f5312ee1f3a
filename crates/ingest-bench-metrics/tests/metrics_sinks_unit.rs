// crates/ingest-bench-metrics/tests/metrics_sinks_unit.rs
// ============================================================================
// Module: Metrics Sink Tests
// Description: SQLite persistence, DynamoDB item layout, and summaries.
// Purpose: Confirm samples survive reopen and map to the stored layout.
// ============================================================================

//! Metrics sink unit tests.

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

use std::sync::Arc;
use std::sync::Mutex;

use ingest_bench_core::Backend;
use ingest_bench_core::DurationSample;
use ingest_bench_core::MetricsError;
use ingest_bench_core::MetricsSink;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_metrics::DynamoDbMetricsSink;
use ingest_bench_metrics::Item;
use ingest_bench_metrics::ItemStore;
use ingest_bench_metrics::ItemValue;
use ingest_bench_metrics::MetricsStoreError;
use ingest_bench_metrics::SqliteMetricsConfig;
use ingest_bench_metrics::SqliteMetricsSink;
use ingest_bench_metrics::summarize;
use proptest::prelude::*;

/// Builds a sample with the given identity and timing.
fn sample(record_id: &str, backend: Backend, operation: &str, elapsed_ms: i64) -> DurationSample {
    DurationSample {
        record_id: record_id.to_string(),
        backend,
        operation: operation.to_string(),
        start_ms: 1_000,
        end_ms: 1_000 + elapsed_ms,
        elapsed_ms,
        num_records: None,
        is_first_call: None,
    }
}

/// Item store remembering every put.
#[derive(Default)]
struct RecordingStore {
    /// Puts observed as (table, item).
    puts: Mutex<Vec<(String, Item)>>,
}

impl ItemStore for RecordingStore {
    fn put_item(&self, table: &str, item: Item) -> Result<(), MetricsError> {
        self.puts.lock().unwrap().push((table.to_string(), item));
        Ok(())
    }
}

#[test]
fn sqlite_samples_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = SqliteMetricsConfig::new(dir.path().join("metrics.db"));
    {
        let sink = SqliteMetricsSink::open(&config).unwrap();
        let mut first = sample("a", Backend::SearchStore, "query_type_1__small", 12);
        first.is_first_call = Some(true);
        let mut second = sample("b", Backend::RelationalStore, "basic_write", 40);
        second.num_records = Some(500);
        sink.append(&first).unwrap();
        sink.append(&second).unwrap();
    }
    let reopened = SqliteMetricsSink::open(&config).unwrap();
    let samples = reopened.samples().unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].backend, Backend::SearchStore);
    assert_eq!(samples[0].is_first_call, Some(true));
    assert_eq!(samples[0].num_records, None);
    assert_eq!(samples[1].num_records, Some(500));
    assert_eq!(samples[1].elapsed_ms, 40);
}

#[test]
fn sqlite_duplicate_sample_id_is_an_error() {
    let sink = SqliteMetricsSink::in_memory().unwrap();
    let first = sample("dup", Backend::LogStore, "basic_write", 1);
    sink.append(&first).unwrap();

    let err = sink.append(&first).unwrap_err();

    assert!(matches!(err, MetricsError::Io(_)));
    assert_eq!(sink.samples().unwrap().len(), 1);
}

#[test]
fn sqlite_rejects_directory_path() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteMetricsSink::open(&SqliteMetricsConfig::new(dir.path()));
    assert!(matches!(result, Err(MetricsStoreError::Invalid(_))));
}

#[test]
fn timing_instrument_persists_through_sqlite() {
    let sink = Arc::new(SqliteMetricsSink::in_memory().unwrap());
    let timer = TimingInstrument::new(sink.clone(), Arc::new(SystemClock));

    let value: Result<u32, MetricsError> =
        timer.time(TimingScope::new(Backend::TimeseriesStore, "basic_write").with_records(100), || Ok(7));

    assert_eq!(value.unwrap(), 7);
    let samples = sink.samples().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].num_records, Some(100));
}

#[test]
fn dynamodb_items_omit_unset_fields() {
    let store = Arc::new(RecordingStore::default());
    let sink = DynamoDbMetricsSink::new(store.clone(), "benchmark-durations");
    let mut read = sample("r1", Backend::LogStore, "query_type_2__large", 250);
    read.is_first_call = Some(false);
    let mut write = sample("w1", Backend::SearchStore, "basic_write", 90);
    write.num_records = Some(1_200);

    sink.append(&read).unwrap();
    sink.append(&write).unwrap();

    let puts = store.puts.lock().unwrap().clone();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].0, "benchmark-durations");
    let read_item = &puts[0].1;
    assert_eq!(read_item.get("data_store"), Some(&ItemValue::S("log_store".to_string())));
    assert_eq!(read_item.get("exec_time"), Some(&ItemValue::N("250".to_string())));
    assert_eq!(read_item.get("is_first_query"), Some(&ItemValue::Bool(false)));
    assert!(!read_item.contains_key("num_records"));
    let write_item = &puts[1].1;
    assert_eq!(write_item.get("num_records"), Some(&ItemValue::N("1200".to_string())));
    assert!(!write_item.contains_key("is_first_query"));
}

#[test]
fn summaries_separate_first_calls() {
    let mut samples = Vec::new();
    for (index, elapsed) in [100_i64, 10, 20, 30].into_iter().enumerate() {
        let mut run = sample(&format!("s{index}"), Backend::SearchStore, "query_type_1__small", elapsed);
        run.is_first_call = Some(index == 0);
        samples.push(run);
    }
    samples.push(sample("w", Backend::LogStore, "basic_write", 5));

    let summaries = summarize(&samples);

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].backend, Backend::LogStore);
    let query = &summaries[1];
    assert_eq!(query.count, 4);
    assert_eq!(query.first_call_ms, Some(100));
    assert_eq!(query.warm_mean_ms, Some(20.0));
    assert_eq!(query.min_ms, 10);
    assert_eq!(query.max_ms, 100);
}

proptest! {
    #[test]
    fn summaries_account_for_every_sample(elapsed in proptest::collection::vec(0_i64 .. 10_000, 0 .. 40)) {
        let samples: Vec<DurationSample> = elapsed
            .iter()
            .enumerate()
            .map(|(index, ms)| {
                let backend = Backend::ALL[index % Backend::ALL.len()];
                sample(&format!("p{index}"), backend, "basic_write", *ms)
            })
            .collect();
        let summaries = summarize(&samples);
        prop_assert_eq!(summaries.iter().map(|summary| summary.count).sum::<usize>(), samples.len());
        for summary in &summaries {
            prop_assert!(summary.min_ms <= summary.max_ms);
        }
    }
}
