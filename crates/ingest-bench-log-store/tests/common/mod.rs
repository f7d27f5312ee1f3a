// crates/ingest-bench-log-store/tests/common/mod.rs
// ============================================================================
// Module: Log Store Test Fakes
// Description: Scripted in-memory log service client.
// Purpose: Drive writer and reader failure branches deterministically.
// ============================================================================

//! ## Overview
//! A scripted log service client that records every call it receives.

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

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use ingest_bench_core::FieldValue;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::Record;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_log_store::EventsPage;
use ingest_bench_log_store::FilterPage;
use ingest_bench_log_store::InputEvent;
use ingest_bench_log_store::LogStoreClient;
use ingest_bench_log_store::LogStoreError;
use ingest_bench_log_store::PageDirection;
use ingest_bench_log_store::QueryRequest;
use ingest_bench_log_store::QueryResults;
use ingest_bench_log_store::StreamInfo;

/// One observed client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Put with stream, event count, and token.
    Put {
        stream: String,
        events: usize,
        token: Option<String>,
    },
    /// Stream creation.
    Create(String),
    /// Stream description by prefix.
    Describe(String),
    /// Stream page read.
    Get {
        cursor: Option<String>,
    },
    /// Filter search.
    Filter {
        cursor: Option<String>,
    },
    /// Insights start.
    StartQuery,
    /// Insights poll.
    PollQuery,
}

/// Scripted client: each call pops the next scripted response or succeeds.
#[derive(Default)]
pub struct FakeLogClient {
    pub calls: Mutex<Vec<Call>>,
    pub put_results: Mutex<VecDeque<Result<Option<String>, LogStoreError>>>,
    pub create_results: Mutex<VecDeque<Result<(), LogStoreError>>>,
    pub streams: Mutex<Vec<StreamInfo>>,
    pub pages: Mutex<VecDeque<Result<EventsPage, LogStoreError>>>,
    pub filter_pages: Mutex<VecDeque<Result<FilterPage, LogStoreError>>>,
    pub query_results: Mutex<VecDeque<QueryResults>>,
    pub query_requests: Mutex<Vec<QueryRequest>>,
}

impl FakeLogClient {
    /// Creates a fake with no scripted responses.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues the result of the next put.
    pub fn script_put(&self, result: Result<Option<String>, LogStoreError>) {
        self.put_results.lock().unwrap().push_back(result);
    }

    /// Returns every call observed so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the token carried by each put in order.
    pub fn put_tokens(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Put {
                    token, ..
                } => Some(token),
                _ => None,
            })
            .collect()
    }
}

impl LogStoreClient for FakeLogClient {
    fn put_log_events(
        &self,
        _log_group: &str,
        stream: &str,
        events: &[InputEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, LogStoreError> {
        let count = self.calls.lock().unwrap().iter().filter(|call| matches!(call, Call::Put { .. })).count();
        self.calls.lock().unwrap().push(Call::Put {
            stream: stream.to_string(),
            events: events.len(),
            token: sequence_token.map(str::to_string),
        });
        self.put_results.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Some(format!("token-{}", count + 1))))
    }

    fn create_log_stream(&self, _log_group: &str, stream: &str) -> Result<(), LogStoreError> {
        self.calls.lock().unwrap().push(Call::Create(stream.to_string()));
        self.create_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn describe_log_streams(&self, _log_group: &str, prefix: &str) -> Result<Vec<StreamInfo>, LogStoreError> {
        self.calls.lock().unwrap().push(Call::Describe(prefix.to_string()));
        Ok(self.streams.lock().unwrap().iter().filter(|info| info.name.starts_with(prefix)).cloned().collect())
    }

    fn get_log_events(
        &self,
        _log_group: &str,
        _stream: &str,
        _limit: i32,
        _direction: PageDirection,
        cursor: Option<&str>,
    ) -> Result<EventsPage, LogStoreError> {
        self.calls.lock().unwrap().push(Call::Get {
            cursor: cursor.map(str::to_string),
        });
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(EventsPage::default()))
    }

    fn filter_log_events(
        &self,
        _log_group: &str,
        _stream: &str,
        _pattern: &str,
        _limit: i32,
        cursor: Option<&str>,
    ) -> Result<FilterPage, LogStoreError> {
        self.calls.lock().unwrap().push(Call::Filter {
            cursor: cursor.map(str::to_string),
        });
        self.filter_pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(FilterPage::default()))
    }

    fn start_query(&self, request: &QueryRequest) -> Result<String, LogStoreError> {
        self.calls.lock().unwrap().push(Call::StartQuery);
        self.query_requests.lock().unwrap().push(request.clone());
        Ok("query-1".to_string())
    }

    fn get_query_results(&self, _query_id: &str) -> Result<QueryResults, LogStoreError> {
        self.calls.lock().unwrap().push(Call::PollQuery);
        self.query_results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LogStoreError::Service("no scripted query result".to_string()))
    }
}

/// Builds `count` event records with distinct times.
pub fn records(count: usize) -> Vec<Record> {
    (0 .. count)
        .map(|index| {
            Record::new()
                .with("time", FieldValue::Timestamp(1_700_000_000_000 + i64::try_from(index).unwrap()))
                .with("job_id", FieldValue::Text(format!("job-{index}")))
                .with("finished", FieldValue::Boolean(false))
        })
        .collect()
}

/// Builds a timer over an in-memory sink.
pub fn timer() -> (TimingInstrument, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (TimingInstrument::new(sink.clone(), Arc::new(SystemClock)), sink)
}
