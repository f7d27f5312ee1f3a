// crates/ingest-bench-timeseries-store/tests/timeseries_writer_unit.rs
// ============================================================================
// Module: Time-Series Writer Tests
// Description: Batching, type tagging, and reject-and-continue behavior.
// Purpose: Confirm refusals are logged per record and other failures abort.
// ============================================================================

//! Time-series writer unit tests.

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
use ingest_bench_core::FieldValue;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::MemoryEventLog;
use ingest_bench_core::Record;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::ingestion_event_schema;
use ingest_bench_timeseries_store::MeasureType;
use ingest_bench_timeseries_store::RejectedRecord;
use ingest_bench_timeseries_store::TimeSeriesError;
use ingest_bench_timeseries_store::TimeSeriesWriteClient;
use ingest_bench_timeseries_store::TimeSeriesWriter;
use serde_json::json;

use crate::common::FakeWriteClient;
use crate::common::config;
use crate::common::event_records;
use crate::common::timer;

/// Builds a writer over `client`, returning its log and metrics sink.
fn writer(client: Arc<dyn TimeSeriesWriteClient>) -> (TimeSeriesWriter, Arc<MemoryEventLog>, Arc<InMemoryMetricsSink>) {
    let (timer, sink) = timer();
    let log = Arc::new(MemoryEventLog::new());
    (TimeSeriesWriter::new(client, config(), ingestion_event_schema(), timer, log.clone()), log, sink)
}

#[test]
fn splits_into_hundred_record_requests_under_one_sample() {
    let client = FakeWriteClient::accepting();
    let (writer, _, sink) = writer(client.clone());

    let report = writer.write_records(event_records(250)).unwrap();

    assert_eq!(report.submitted, 250);
    assert_eq!(report.requests, 3);
    assert_eq!(report.rejected, 0);
    let mut sizes: Vec<usize> = client.requests().iter().map(Vec::len).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![50, 100, 100]);
    let samples = sink.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].operation, "basic_write");
    assert_eq!(samples[0].num_records, Some(250));
    assert_eq!(samples[0].backend, Backend::TimeseriesStore);
}

#[test]
fn values_are_stringified_with_type_tags() {
    let client = FakeWriteClient::accepting();
    let (writer, _, _) = writer(client.clone());

    writer.write_records(event_records(1)).unwrap();

    let record = client.requests()[0][0].clone();
    assert_eq!(record.time_ms, "1700000000000");
    assert_eq!(record.measure_name, "record");
    let dimension = |name: &str| record.dimensions.iter().find(|dim| dim.name == name).map(|dim| dim.value.clone());
    assert_eq!(dimension("job_id").as_deref(), Some("job-00000"));
    assert_eq!(dimension("created_at").as_deref(), Some("1700000000000"));
    assert_eq!(dimension("num_stages").as_deref(), Some("6"));
    assert!(dimension("time").is_none());
    let measure = |name: &str| record.measures.iter().find(|m| m.name == name).map(|m| (m.value.clone(), m.value_type));
    assert_eq!(measure("stage"), Some(("In-queue".to_string(), MeasureType::Varchar)));
    assert_eq!(measure("errored"), Some(("false".to_string(), MeasureType::Boolean)));
    assert_eq!(measure("finished"), Some(("false".to_string(), MeasureType::Boolean)));
    assert_eq!(measure("stage_progress").map(|(_, kind)| kind), Some(MeasureType::Bigint));
}

#[test]
fn rejected_records_are_logged_and_skipped() {
    let client = FakeWriteClient::new(|index, _| {
        if index == 0 {
            Err(TimeSeriesError::Rejected(vec![
                RejectedRecord {
                    index: 3,
                    reason: "duplicate timestamp".to_string(),
                },
                RejectedRecord {
                    index: 7,
                    reason: "out of retention window".to_string(),
                },
            ]))
        } else {
            Ok(())
        }
    });
    let (writer, log, sink) = writer(client.clone());

    let report = writer.write_records(event_records(150)).unwrap();

    assert_eq!(report.rejected, 2);
    assert_eq!(report.accepted(), 148);
    assert_eq!(client.requests().len(), 2);
    let rejected: Vec<_> = log.events().into_iter().filter(|event| event.event == "record_rejected").collect();
    assert_eq!(rejected.len(), 2);
    assert_eq!(rejected[0].fields.get("record_index"), Some(&json!(3)));
    assert_eq!(rejected[1].message, "out of retention window");
    assert_eq!(sink.samples().len(), 1);
}

#[test]
fn service_failure_aborts_without_sample() {
    let client = FakeWriteClient::new(|_, _| Err(TimeSeriesError::Service("throttled".to_string())));
    let (writer, log, sink) = writer(client);

    let err = writer.write_records(event_records(30)).unwrap_err();

    assert_eq!(err, TimeSeriesError::Service("throttled".to_string()));
    assert!(sink.samples().is_empty());
    assert!(log.event_names().contains(&"write_failed"));
}

#[test]
fn missing_time_field_fails_before_any_request() {
    let client = FakeWriteClient::accepting();
    let (writer, _, _) = writer(client.clone());
    let record = Record::new().with("stage", FieldValue::Text("Staged".to_string()));

    let err = writer.write_records(vec![record]).unwrap_err();

    assert!(matches!(err, TimeSeriesError::Invalid(_)));
    assert!(client.requests().is_empty());
}

#[test]
fn empty_input_sends_nothing() {
    let client = FakeWriteClient::accepting();
    let (writer, _, sink) = writer(client.clone());

    let report = writer.write_records(Vec::new()).unwrap();

    assert_eq!(report.submitted, 0);
    assert!(client.requests().is_empty());
    assert!(sink.samples().is_empty());
}

#[test]
fn record_writer_reports_accepted_count() {
    let client = FakeWriteClient::new(|_, _| {
        Err(TimeSeriesError::Rejected(vec![RejectedRecord {
            index: 0,
            reason: "duplicate".to_string(),
        }]))
    });
    let (writer, _, _) = writer(client);

    assert_eq!(writer.backend(), Backend::TimeseriesStore);
    assert_eq!(writer.write(event_records(5)).unwrap(), 4);
}

#[test]
fn concurrent_request_failures_surface_one_and_log_the_rest() {
    let rendezvous = crate::common::Rendezvous::new(2);
    let gate = Arc::clone(&rendezvous);
    let client = FakeWriteClient::new(move |_, records| {
        assert!(gate.arrive(), "both requests must be in flight together");
        Err(TimeSeriesError::Service(format!("throttled at {}", records[0].time_ms)))
    });
    let (writer, log, sink) = writer(client.clone());

    let err = writer.write_records(event_records(200)).unwrap_err();

    let TimeSeriesError::Service(surfaced) = &err else {
        panic!("unexpected error: {err:?}");
    };
    let first = "throttled at 1700000000000";
    let second = "throttled at 1700000000100";
    assert!(surfaced == first || surfaced == second);
    assert_eq!(client.requests().len(), 2);

    let logged: Vec<String> = log
        .events()
        .into_iter()
        .filter(|event| event.event == "write_worker_failed")
        .map(|event| event.message)
        .collect();
    assert_eq!(logged.len(), 1);
    let other = if surfaced == first { second } else { first };
    assert!(logged[0].contains(other), "logged failure should name {other}: {}", logged[0]);
    assert!(sink.samples().is_empty());
}
