// crates/ingest-bench-search-store/tests/common/mod.rs
// ============================================================================
// Module: Search Store Test Fakes
// Description: Closure-scripted search transport.
// Purpose: Drive bulk bisection, backoff, and paging branches deterministically.
// ============================================================================

//! ## Overview
//! A transport whose responses come from a closure over the call index and
//! request, recording every request it receives.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers shared across test binaries."
)]

use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::time::Duration;

use ingest_bench_core::FieldValue;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::Record;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_search_store::RequestBody;
use ingest_bench_search_store::RetryConfig;
use ingest_bench_search_store::SearchRequest;
use ingest_bench_search_store::SearchResponse;
use ingest_bench_search_store::SearchStoreConfig;
use ingest_bench_search_store::SearchStoreError;
use ingest_bench_search_store::SearchTransport;
use serde_json::Value;
use serde_json::json;

/// Response script: call index (from zero) and request to response.
type Responder = Box<dyn Fn(usize, &SearchRequest) -> SearchResponse + Send + Sync>;

/// Scripted transport.
pub struct FakeTransport {
    /// Produces each response.
    responder: Responder,
    /// Requests in arrival order.
    requests: Mutex<Vec<SearchRequest>>,
}

impl FakeTransport {
    /// Creates a transport answering through `responder`.
    pub fn new(responder: impl Fn(usize, &SearchRequest) -> SearchResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Returns the recorded requests.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the recorded bulk requests.
    pub fn bulk_requests(&self) -> Vec<SearchRequest> {
        self.requests().into_iter().filter(|request| request.path == "_bulk").collect()
    }
}

impl SearchTransport for FakeTransport {
    fn send(&self, request: &SearchRequest) -> Result<SearchResponse, SearchStoreError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        Ok((self.responder)(index, request))
    }
}

/// Holds each arriving caller until `parties` callers are inside at once.
pub struct Rendezvous {
    /// Callers arrived so far.
    arrived: Mutex<usize>,
    /// Signalled on every arrival.
    ready: Condvar,
    /// Callers required before anyone proceeds.
    parties: usize,
}

impl Rendezvous {
    /// Creates a rendezvous for `parties` callers.
    pub fn new(parties: usize) -> Arc<Self> {
        Arc::new(Self {
            arrived: Mutex::new(0),
            ready: Condvar::new(),
            parties,
        })
    }

    /// Waits for the other parties; false when they never all arrive.
    pub fn arrive(&self) -> bool {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        self.ready.notify_all();
        let (_guard, wait) =
            self.ready.wait_timeout_while(arrived, Duration::from_secs(5), |arrived| *arrived < self.parties).unwrap();
        !wait.timed_out()
    }
}

/// Builds a response with a JSON body.
pub fn respond(status: u16, body: Value) -> SearchResponse {
    SearchResponse {
        status,
        body: Some(body),
    }
}

/// Builds a clean bulk acknowledgement.
pub fn bulk_ok() -> SearchResponse {
    respond(200, json!({"errors": false, "items": []}))
}

/// Returns the NDJSON lines of a bulk request.
pub fn bulk_lines(request: &SearchRequest) -> Vec<String> {
    match &request.body {
        RequestBody::NdJson(body) => body.lines().map(str::to_string).collect(),
        other => panic!("expected an NDJSON body, got {other:?}"),
    }
}

/// Returns the record count of a bulk request, asserting pairs are intact.
pub fn bulk_record_count(request: &SearchRequest) -> usize {
    let lines = bulk_lines(request);
    assert_eq!(lines.len() % 2, 0, "request split an action/document pair");
    for pair in lines.chunks(2) {
        let action: Value = serde_json::from_str(&pair[0]).unwrap();
        assert!(action.get("index").is_some(), "first line of a pair must be an action");
        let document: Value = serde_json::from_str(&pair[1]).unwrap();
        assert!(document.get("index").is_none(), "second line of a pair must be a document");
    }
    lines.len() / 2
}

/// Builds `count` event records with distinct job ids.
pub fn records(count: usize) -> Vec<Record> {
    (0 .. count)
        .map(|index| {
            Record::new()
                .with("time", FieldValue::Timestamp(1_700_000_000_000 + i64::try_from(index).unwrap()))
                .with("job_id", FieldValue::Text(format!("job-{index}")))
                .with("errored", FieldValue::Boolean(false))
        })
        .collect()
}

/// Builds a config with millisecond-scale backoff.
pub fn fast_config() -> SearchStoreConfig {
    let mut config = SearchStoreConfig::new("http://127.0.0.1:9200");
    config.index = "events".to_string();
    config.retry = RetryConfig {
        base_delay_ms: 1,
        max_delay_ms: 4,
    };
    config.gateway_timeout_cooldown_ms = 60;
    config
}

/// Builds a timer over an in-memory sink.
pub fn timer() -> (TimingInstrument, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (TimingInstrument::new(sink.clone(), Arc::new(SystemClock)), sink)
}
