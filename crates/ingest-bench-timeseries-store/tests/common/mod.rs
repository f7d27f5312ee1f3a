// crates/ingest-bench-timeseries-store/tests/common/mod.rs
// ============================================================================
// Module: Time-Series Store Test Fakes
// Description: Scripted write and query clients plus event fixtures.
// Purpose: Drive rejection, failure, and paging branches deterministically.
// ============================================================================

//! ## Overview
//! Fake clients that record every call and answer from a closure or a
//! queue of pages.

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
use std::sync::Condvar;
use std::sync::Mutex;
use std::time::Duration;

use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::IngestionBatch;
use ingest_bench_core::IngestionJob;
use ingest_bench_core::Record;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_timeseries_store::Cell;
use ingest_bench_timeseries_store::ColumnInfo;
use ingest_bench_timeseries_store::ColumnType;
use ingest_bench_timeseries_store::QueryPage;
use ingest_bench_timeseries_store::TimeSeriesError;
use ingest_bench_timeseries_store::TimeSeriesQueryClient;
use ingest_bench_timeseries_store::TimeSeriesStoreConfig;
use ingest_bench_timeseries_store::TimeSeriesWriteClient;
use ingest_bench_timeseries_store::WriteRecord;

/// Response script for writes: call index and records in, result out.
type WriteScript = dyn Fn(usize, &[WriteRecord]) -> Result<(), TimeSeriesError> + Send + Sync;

/// Write client answering from a closure.
pub struct FakeWriteClient {
    /// Script producing each response.
    script: Box<WriteScript>,
    /// Every submitted request.
    requests: Mutex<Vec<Vec<WriteRecord>>>,
}

impl FakeWriteClient {
    /// Creates a fake answering with `script`.
    pub fn new(script: impl Fn(usize, &[WriteRecord]) -> Result<(), TimeSeriesError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Creates a fake accepting every request.
    pub fn accepting() -> Arc<Self> {
        Self::new(|_, _| Ok(()))
    }

    /// Returns every submitted request.
    pub fn requests(&self) -> Vec<Vec<WriteRecord>> {
        self.requests.lock().unwrap().clone()
    }
}

impl TimeSeriesWriteClient for FakeWriteClient {
    fn write_records(&self, _database: &str, _table: &str, records: &[WriteRecord]) -> Result<(), TimeSeriesError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(records.to_vec());
            requests.len() - 1
        };
        (self.script)(index, records)
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

/// One observed query call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCall {
    /// Page size requested.
    pub page_size: i32,
    /// Token sent.
    pub next_token: Option<String>,
}

/// Query client answering from a queue of pages.
#[derive(Default)]
pub struct FakeQueryClient {
    /// Pages returned in order; an exhausted queue fails.
    pub pages: Mutex<VecDeque<Result<QueryPage, TimeSeriesError>>>,
    /// Every observed call.
    pub calls: Mutex<Vec<QueryCall>>,
}

impl FakeQueryClient {
    /// Creates a fake returning `pages` in order.
    pub fn with_pages(pages: Vec<Result<QueryPage, TimeSeriesError>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Returns every observed call.
    pub fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TimeSeriesQueryClient for FakeQueryClient {
    fn query(&self, _sql: &str, page_size: i32, next_token: Option<&str>) -> Result<QueryPage, TimeSeriesError> {
        self.calls.lock().unwrap().push(QueryCall {
            page_size,
            next_token: next_token.map(str::to_string),
        });
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Err(TimeSeriesError::Service("no scripted page".to_string())))
    }
}

/// Builds a page of scalar rows with an optional token.
pub fn page(columns: &[(&str, ColumnType)], rows: &[&[&str]], next_token: Option<&str>) -> QueryPage {
    QueryPage {
        columns: columns
            .iter()
            .map(|(name, column_type)| ColumnInfo {
                name: (*name).to_string(),
                column_type: column_type.clone(),
            })
            .collect(),
        rows: rows.iter().map(|row| row.iter().map(|cell| Cell::Scalar((*cell).to_string())).collect()).collect(),
        next_token: next_token.map(str::to_string),
    }
}

/// Builds `count` ingestion event records with distinct times.
pub fn event_records(count: usize) -> Vec<Record> {
    let batch = Arc::new(IngestionBatch {
        batch_id: "16311212173__1700000000__1110".to_string(),
        org_id: "1".to_string(),
        user_id: "1110".to_string(),
        repo_id: "16311212173".to_string(),
        repo_version: "1700000000".to_string(),
        priority: "HIGH".to_string(),
        num_jobs: count,
        job_failure_rate: 0.0,
        created_at_ms: 1_700_000_000_000,
    });
    (0 .. count)
        .map(|index| {
            IngestionJob::new(
                batch.clone(),
                format!("job-{index:05}"),
                "ADD".to_string(),
                "ABCDEF_GHIJ".to_string(),
                1_700_000_000_000 + i64::try_from(index).unwrap(),
            )
            .as_record()
        })
        .collect()
}

/// Returns a configuration with a small page size.
pub fn config() -> TimeSeriesStoreConfig {
    let mut config = TimeSeriesStoreConfig::new("bench");
    config.page_size = 2;
    config
}

/// Builds a timer over an in-memory sink.
pub fn timer() -> (TimingInstrument, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (TimingInstrument::new(sink.clone(), Arc::new(SystemClock)), sink)
}
