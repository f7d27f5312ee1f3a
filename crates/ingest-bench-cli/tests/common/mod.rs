// crates/ingest-bench-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Helpers
// Description: Recording and failing adapters plus workload builders.
// Purpose: Drive the benchmark without any external service.
// ============================================================================

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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::IngestionBatch;
use ingest_bench_core::IngestionJob;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;
use ingest_bench_core::Record;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;

/// Writer that keeps every batch it receives.
pub struct RecordingWriter {
    /// Backend reported.
    backend: Backend,
    /// Batches received in order.
    batches: Arc<Mutex<Vec<Vec<Record>>>>,
}

impl RecordingWriter {
    /// Creates a writer and a handle to its received batches.
    pub fn new(backend: Backend) -> (Box<dyn RecordWriter>, Arc<Mutex<Vec<Vec<Record>>>>) {
        let batches = Arc::new(Mutex::new(Vec::new()));
        let writer = Self {
            backend,
            batches: Arc::clone(&batches),
        };
        (Box::new(writer), batches)
    }
}

impl RecordWriter for RecordingWriter {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError> {
        let count = records.len();
        self.batches.lock().unwrap().push(records);
        Ok(count)
    }
}

/// Writer that always fails.
pub struct FailingWriter(pub Backend);

impl RecordWriter for FailingWriter {
    fn backend(&self) -> Backend {
        self.0
    }

    fn write(&self, _records: Vec<Record>) -> Result<usize, BackendError> {
        Err(BackendError::write(self.0, "throttled beyond retry budget"))
    }
}

/// Runner returning a fixed row count and remembering payloads.
pub struct CountingRunner {
    /// Backend reported.
    backend: Backend,
    /// Rows returned per run.
    rows: u64,
    /// Payloads received.
    payloads: Arc<Mutex<Vec<QueryPayload>>>,
}

impl CountingRunner {
    /// Creates a runner and a handle to its received payloads.
    pub fn new(backend: Backend, rows: u64) -> (Box<dyn QueryRunner>, Arc<Mutex<Vec<QueryPayload>>>) {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let runner = Self {
            backend,
            rows,
            payloads: Arc::clone(&payloads),
        };
        (Box::new(runner), payloads)
    }
}

impl QueryRunner for CountingRunner {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(self.rows)
    }
}

/// Runner that always fails.
pub struct FailingRunner(pub Backend);

impl QueryRunner for FailingRunner {
    fn backend(&self) -> Backend {
        self.0
    }

    fn run(&self, _payload: &QueryPayload) -> Result<u64, BackendError> {
        Err(BackendError::query(self.0, "syntax error at or near LATERAL"))
    }
}

/// Timing instrument over a fresh in-memory sink.
pub fn timer() -> (TimingInstrument, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (TimingInstrument::new(sink.clone(), Arc::new(SystemClock)), sink)
}

/// Builds `num_jobs` jobs in one batch with a fixed failure rate.
pub fn jobs(num_jobs: usize, job_failure_rate: f64) -> Vec<IngestionJob> {
    let batch = Arc::new(IngestionBatch {
        batch_id: "16554252419__1661749456__1110".to_string(),
        org_id: "1".to_string(),
        user_id: "1110".to_string(),
        repo_id: "16554252419".to_string(),
        repo_version: "1661749456".to_string(),
        priority: "HIGH".to_string(),
        num_jobs,
        job_failure_rate,
        created_at_ms: 1_661_749_456_000,
    });
    (0 .. num_jobs)
        .map(|index| {
            IngestionJob::new(
                Arc::clone(&batch),
                format!("job-{index:05}"),
                "ADD".to_string(),
                "DATASET_0001".to_string(),
                1_661_749_456_000,
            )
        })
        .collect()
}

/// Path of the catalog shipped at the repository root.
pub fn shipped_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/queries.toml")
}
