// crates/ingest-bench-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Deterministic clocks and batch builders for core tests.
// Purpose: Keep integration tests free of wall-clock and RNG noise.
// ============================================================================

//! ## Overview
//! Deterministic clock and batch fixtures shared by core integration tests.

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
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use ingest_bench_core::Clock;
use ingest_bench_core::IngestionBatch;

/// Clock that advances by a fixed step on every read.
pub struct SteppingClock {
    /// Next value returned.
    next: AtomicI64,
    /// Increment per read.
    step: i64,
}

impl SteppingClock {
    /// Creates a clock starting at `start` and advancing by `step`.
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// Builds a batch with the given size and failure rate.
pub fn batch(num_jobs: usize, job_failure_rate: f64) -> Arc<IngestionBatch> {
    Arc::new(IngestionBatch {
        batch_id: "16311212173__1700000000__1110".to_string(),
        org_id: "1".to_string(),
        user_id: "1110".to_string(),
        repo_id: "16311212173".to_string(),
        repo_version: "1700000000".to_string(),
        priority: "HIGH".to_string(),
        num_jobs,
        job_failure_rate,
        created_at_ms: 1_700_000_000_000,
    })
}
