// crates/ingest-bench-relational-store/tests/common/mod.rs
// ============================================================================
// Module: Relational Store Test Helpers
// Description: Event fixtures and a connection that fails on demand.
// Purpose: Exercise the adapter on in-memory SQLite and injected failures.
// ============================================================================

//! ## Overview
//! Event-record fixtures plus a wrapper connection that fails a chosen
//! insert call.

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

use ingest_bench_core::FieldSpec;
use ingest_bench_core::InMemoryMetricsSink;
use ingest_bench_core::IngestionBatch;
use ingest_bench_core::IngestionJob;
use ingest_bench_core::Record;
use ingest_bench_core::SystemClock;
use ingest_bench_core::TimingInstrument;
use ingest_bench_relational_store::RelationalConnection;
use ingest_bench_relational_store::RelationalEngine;
use ingest_bench_relational_store::RelationalStoreError;
use ingest_bench_relational_store::RowVisitor;
use ingest_bench_relational_store::SqlValue;
use ingest_bench_relational_store::SqliteConnection;

/// `SQLite` connection whose Nth insert (from one) fails.
pub struct FailingInsertConnection {
    /// Wrapped connection.
    inner: SqliteConnection,
    /// Insert call that fails.
    fail_on: usize,
    /// Insert calls so far.
    calls: usize,
}

impl FailingInsertConnection {
    /// Wraps an in-memory database.
    pub fn new(fail_on: usize) -> Self {
        Self {
            inner: SqliteConnection::open(":memory:").unwrap(),
            fail_on,
            calls: 0,
        }
    }
}

impl RelationalConnection for FailingInsertConnection {
    fn engine(&self) -> RelationalEngine {
        RelationalEngine::Sqlite
    }

    fn execute(&mut self, sql: &str) -> Result<(), RelationalStoreError> {
        self.inner.execute(sql)
    }

    fn insert_rows(&mut self, table: &str, columns: &[FieldSpec], rows: &[Vec<SqlValue>]) -> Result<usize, RelationalStoreError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            return Err(RelationalStoreError::Statement("disk I/O error".to_string()));
        }
        self.inner.insert_rows(table, columns, rows)
    }

    fn stream_rows(&mut self, sql: &str, fetch_size: usize, visit: &mut RowVisitor<'_>) -> Result<u64, RelationalStoreError> {
        self.inner.stream_rows(sql, fetch_size, visit)
    }

    fn count_rows(&mut self, sql: &str, fetch_size: usize) -> Result<u64, RelationalStoreError> {
        self.inner.count_rows(sql, fetch_size)
    }
}

/// Builds `count` full event records from one batch.
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
            let job = IngestionJob::new(
                batch.clone(),
                format!("job-{index:05}"),
                "ADD".to_string(),
                "ABCDEF_GHIJ".to_string(),
                1_700_000_000_000 + i64::try_from(index).unwrap(),
            );
            job.as_record()
        })
        .collect()
}

/// Builds a timer over an in-memory sink.
pub fn timer() -> (TimingInstrument, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (TimingInstrument::new(sink.clone(), Arc::new(SystemClock)), sink)
}
