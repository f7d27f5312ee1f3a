// crates/ingest-bench-cli/src/driver.rs
// ============================================================================
// Module: Benchmark Driver
// Description: Stage-by-stage write rounds and repeated catalog reads.
// Purpose: Exercise every configured backend with the same workload.
// Dependencies: ingest-bench-config, ingest-bench-core, rand, serde, thiserror
// ============================================================================

//! ## Overview
//! The driver owns no backend logic. It advances synthetic jobs one stage per
//! round and hands each round's snapshot to every writer, each on its own
//! copy of the records. A failing backend is logged and the others carry
//! on. Reads run every catalog shape against every runner, timing each
//! repetition.
//!
//! A job that errors is written once more with `errored = true` and then
//! retired from later rounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_config::GeneratorConfig;
use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EventLog;
use ingest_bench_core::IngestionJob;
use ingest_bench_core::LogEvent;
use ingest_bench_core::MetricsError;
use ingest_bench_core::QueryCatalog;
use ingest_bench_core::QueryRunner;
use ingest_bench_core::QueryShape;
use ingest_bench_core::Record;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_core::generate_batch_pair;
use ingest_bench_core::generate_jobs;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component name used in log events.
const COMPONENT: &str = "driver";
/// Timed repetitions per shape and backend.
pub const READ_REPETITIONS: usize = 10;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure of one timed read.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The backend rejected or failed the query.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The duration sample could not be stored.
    #[error("metrics sink failed: {0}")]
    Metrics(#[from] MetricsError),
}

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Writers and query runners for the enabled backends.
#[derive(Default)]
pub struct BenchTargets {
    /// Record writers in canonical backend order.
    writers: Vec<Box<dyn RecordWriter>>,
    /// Query runners in canonical backend order.
    runners: Vec<Box<dyn QueryRunner>>,
}

impl BenchTargets {
    /// Creates an empty target set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a writer.
    pub fn push_writer(&mut self, writer: Box<dyn RecordWriter>) {
        self.writers.push(writer);
    }

    /// Adds a query runner.
    pub fn push_runner(&mut self, runner: Box<dyn QueryRunner>) {
        self.runners.push(runner);
    }

    /// Returns the backends that have a writer or a runner.
    #[must_use]
    pub fn backends(&self) -> Vec<Backend> {
        let mut backends: Vec<Backend> = self
            .writers
            .iter()
            .map(|writer| writer.backend())
            .chain(self.runners.iter().map(|runner| runner.backend()))
            .collect();
        backends.sort();
        backends.dedup();
        backends
    }

    /// Returns true when nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty() && self.runners.is_empty()
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one backend write within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendOutcome {
    /// Backend written.
    pub backend: Backend,
    /// Records accepted, when the write succeeded.
    pub accepted: Option<usize>,
    /// Failure detail, when the write failed.
    pub error: Option<String>,
}

/// One stage snapshot written to every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Batch the jobs belong to.
    pub batch_id: String,
    /// Zero-based round number.
    pub round: usize,
    /// Records in the snapshot.
    pub submitted: usize,
    /// Records carrying `errored = true`.
    pub errored: usize,
    /// Records carrying `finished = true`.
    pub finished: usize,
    /// Per-backend results.
    pub outcomes: Vec<BackendOutcome>,
}

impl RoundReport {
    /// Returns true when any backend failed this round.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.error.is_some())
    }
}

/// Timed runs of one shape against one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutcome {
    /// Query shape.
    pub shape: QueryShape,
    /// Backend queried.
    pub backend: Backend,
    /// Operation name recorded with each sample.
    pub operation: String,
    /// Successful repetitions.
    pub runs: usize,
    /// Rows drained by the last successful run.
    pub rows: u64,
    /// Failure that stopped the repetitions, if any.
    pub error: Option<String>,
}

/// Everything a multi-iteration run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Write rounds in order.
    pub rounds: Vec<RoundReport>,
    /// Read outcomes in order.
    pub reads: Vec<ReadOutcome>,
}

impl RunReport {
    /// Returns true when any write or read failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.rounds.iter().any(RoundReport::has_failures) || self.reads.iter().any(|read| read.error.is_some())
    }
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Runs write rounds and catalog reads against a target set.
pub struct Driver {
    /// Enabled backends.
    targets: BenchTargets,
    /// Timer for reads and clock for stage timestamps.
    timer: TimingInstrument,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl Driver {
    /// Creates a driver.
    #[must_use]
    pub fn new(targets: BenchTargets, timer: TimingInstrument, log: Arc<dyn EventLog>) -> Self {
        Self {
            targets,
            timer,
            log,
        }
    }

    /// Returns the target set.
    #[must_use]
    pub const fn targets(&self) -> &BenchTargets {
        &self.targets
    }

    /// Writes `rounds` stage snapshots of `jobs`, advancing them between
    /// rounds.
    ///
    /// Stops early once every job has been retired.
    pub fn write_jobs<R: Rng + ?Sized>(
        &self,
        jobs: &mut [IngestionJob],
        rounds: usize,
        rng: &mut R,
    ) -> Vec<RoundReport> {
        let batch_id = jobs.first().map(|job| job.batch().batch_id.clone()).unwrap_or_default();
        let mut retired = vec![false; jobs.len()];
        let mut reports = Vec::with_capacity(rounds);
        for round in 0 .. rounds {
            let snapshot: Vec<&IngestionJob> =
                jobs.iter().zip(&retired).filter(|(_, retired)| !**retired).map(|(job, _)| job).collect();
            if snapshot.is_empty() {
                break;
            }
            let errored = snapshot.iter().filter(|job| job.errored()).count();
            let finished = snapshot.iter().filter(|job| job.finished()).count();
            let records: Vec<Record> = snapshot.iter().map(|job| job.as_record()).collect();
            self.log.record(
                &LogEvent::info(COMPONENT, "round_started", "writing stage snapshot")
                    .field("batch_id", batch_id.as_str())
                    .field("round", round)
                    .field("records", records.len()),
            );
            let outcomes = self.fan_out(&records);
            reports.push(RoundReport {
                batch_id: batch_id.clone(),
                round,
                submitted: records.len(),
                errored,
                finished,
                outcomes,
            });

            let now_ms = self.timer.clock().now_ms();
            for (job, retired) in jobs.iter_mut().zip(retired.iter_mut()) {
                if job.errored() {
                    *retired = true;
                } else {
                    job.transition_to_next_stage(rng, now_ms);
                }
            }
        }
        reports
    }

    /// Generates `pairs` batch pairs and writes every stage of each batch.
    pub fn write_batch_pairs<R: Rng + ?Sized>(
        &self,
        generator: &GeneratorConfig,
        pairs: usize,
        rng: &mut R,
    ) -> Vec<RoundReport> {
        let mut reports = Vec::new();
        for _ in 0 .. pairs {
            let now_ms = self.timer.clock().now_ms();
            let (first, second) =
                generate_batch_pair(rng, generator.min_jobs, generator.max_jobs, &generator.failure_rates, now_ms);
            for batch in [first, second] {
                let batch = Arc::new(batch);
                self.log.record(
                    &LogEvent::info(COMPONENT, "batch_generated", "generated ingestion batch")
                        .field("batch_id", batch.batch_id.as_str())
                        .field("num_jobs", batch.num_jobs)
                        .field("job_failure_rate", batch.job_failure_rate),
                );
                let mut jobs = generate_jobs(&batch, rng, now_ms);
                reports.extend(self.write_jobs(&mut jobs, generator.rounds, rng));
            }
        }
        reports
    }

    /// Runs every catalog shape against every runner, `repetitions` times
    /// each, recording operation `<shape>__<scale>`.
    pub fn read_catalog(&self, catalog: &QueryCatalog, scale: &str, repetitions: usize) -> Vec<ReadOutcome> {
        let mut outcomes = Vec::new();
        for (shape, queries) in catalog.iter() {
            let operation = format!("{}__{scale}", shape.label());
            for runner in &self.targets.runners {
                let backend = runner.backend();
                let payload = queries.payload(backend);
                let mut outcome = ReadOutcome {
                    shape,
                    backend,
                    operation: operation.clone(),
                    runs: 0,
                    rows: 0,
                    error: None,
                };
                for repetition in 0 .. repetitions {
                    let scope = TimingScope::new(backend, operation.as_str()).with_first_call(repetition == 0);
                    let result: Result<u64, DriverError> =
                        self.timer.time(scope, || runner.run(&payload).map_err(DriverError::from));
                    match result {
                        Ok(rows) => {
                            outcome.runs += 1;
                            outcome.rows = rows;
                        }
                        Err(err) => {
                            self.log.record(
                                &LogEvent::warn(COMPONENT, "backend_query_failed", err.to_string())
                                    .field("backend", backend.as_str())
                                    .field("operation", operation.as_str())
                                    .field("repetition", repetition),
                            );
                            outcome.error = Some(err.to_string());
                            break;
                        }
                    }
                }
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Alternates write phases and reads for `iterations` rounds, reading at
    /// scale `<iteration>x` after each write phase.
    pub fn run_iterations<R: Rng + ?Sized>(
        &self,
        generator: &GeneratorConfig,
        catalog: &QueryCatalog,
        iterations: usize,
        pairs_per_iteration: usize,
        rng: &mut R,
    ) -> RunReport {
        let mut report = RunReport::default();
        for iteration in 1 ..= iterations {
            report.rounds.extend(self.write_batch_pairs(generator, pairs_per_iteration, rng));
            report.reads.extend(self.read_catalog(catalog, &format!("{iteration}x"), READ_REPETITIONS));
            self.log.record(
                &LogEvent::info(COMPONENT, "iteration_finished", "iteration complete").field("iteration", iteration),
            );
        }
        report
    }

    /// Writes one snapshot to every writer, each on its own copy.
    fn fan_out(&self, records: &[Record]) -> Vec<BackendOutcome> {
        self.targets
            .writers
            .iter()
            .map(|writer| {
                let backend = writer.backend();
                match writer.write(records.to_vec()) {
                    Ok(accepted) => BackendOutcome {
                        backend,
                        accepted: Some(accepted),
                        error: None,
                    },
                    Err(err) => {
                        self.log.record(
                            &LogEvent::warn(COMPONENT, "backend_write_failed", err.to_string())
                                .field("backend", backend.as_str())
                                .field("records", records.len()),
                        );
                        BackendOutcome {
                            backend,
                            accepted: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}
