// crates/ingest-bench-core/tests/timing_unit.rs
// ============================================================================
// Module: Timing Instrument Tests
// Description: Sample emission rules for successful and failed scopes.
// Purpose: Ensure failures never enter latency accounting.
// ============================================================================

//! Timing instrument unit tests.

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

use ingest_bench_core::Backend;
use ingest_bench_core::DurationSample;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::JsonLinesMetricsSink;
use ingest_bench_core::MetricsError;
use ingest_bench_core::MetricsSink;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;

#[derive(Debug, PartialEq)]
enum OpError {
    Failed,
    Metrics(MetricsError),
}

impl From<MetricsError> for OpError {
    fn from(err: MetricsError) -> Self {
        Self::Metrics(err)
    }
}

struct FailingSink;

impl MetricsSink for FailingSink {
    fn append(&self, _sample: &DurationSample) -> Result<(), MetricsError> {
        Err(MetricsError::Backend("unavailable".to_string()))
    }
}

fn instrument(sink: Arc<dyn MetricsSink>) -> TimingInstrument {
    TimingInstrument::new(sink, Arc::new(common::SteppingClock::new(1_000, 25)))
}

#[test]
fn failed_scope_records_nothing() {
    let sink = Arc::new(InMemoryMetricsSink::new());
    let timer = instrument(sink.clone());
    let result: Result<(), OpError> = timer.time(TimingScope::new(Backend::LogStore, "basic_write"), || Err(OpError::Failed));
    assert_eq!(result, Err(OpError::Failed));
    assert!(sink.samples().is_empty());
}

#[test]
fn successful_scope_records_exactly_one_sample() {
    let sink = Arc::new(InMemoryMetricsSink::new());
    let timer = instrument(sink.clone());
    let scope = TimingScope::new(Backend::SearchStore, "basic_write").with_records(500).with_first_call(true);
    let value = timer.time(scope, || Ok::<_, OpError>(7)).unwrap();
    assert_eq!(value, 7);
    let samples = sink.samples();
    assert_eq!(samples.len(), 1);
    let sample = &samples[0];
    assert!(sample.end_ms >= sample.start_ms);
    assert_eq!(sample.elapsed_ms, 25);
    assert_eq!(sample.backend, Backend::SearchStore);
    assert_eq!(sample.num_records, Some(500));
    assert_eq!(sample.is_first_call, Some(true));
    assert!(sample.record_id.starts_with("1000-"));
}

#[test]
fn sink_failure_surfaces_to_caller() {
    let timer = instrument(Arc::new(FailingSink));
    let result = timer.time(TimingScope::new(Backend::RelationalStore, "basic_write"), || Ok::<_, OpError>(()));
    assert_eq!(result, Err(OpError::Metrics(MetricsError::Backend("unavailable".to_string()))));
}

#[test]
fn json_lines_sink_appends_one_line_per_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.jsonl");
    let timer = instrument(Arc::new(JsonLinesMetricsSink::new(&path).unwrap()));
    for _ in 0 .. 3 {
        timer.time(TimingScope::new(Backend::TimeseriesStore, "query_type_1__small"), || Ok::<_, OpError>(())).unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    let first: DurationSample = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.backend, Backend::TimeseriesStore);
    assert_eq!(first.operation, "query_type_1__small");
}
