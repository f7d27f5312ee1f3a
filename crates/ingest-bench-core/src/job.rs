// crates/ingest-bench-core/src/job.rs
// ============================================================================
// Module: Job State Machine
// Description: Synthetic ingestion jobs progressing through ordered stages.
// Purpose: Drive write volume with per-transition failure injection.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! An [`IngestionJob`] walks the closed [`IngestionStage`] sequence from
//! `In-queue` to `Finished`. Every non-terminal transition draws a uniform
//! value against the owning batch's failure rate; reaching the terminal stage
//! sets `finished` instead. Errored and finished jobs never move again.
//!
//! Randomness and wall-clock time are injected so transitions stay pure with
//! respect to their inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::record::FieldValue;
use crate::record::Record;

// ============================================================================
// SECTION: Stages
// ============================================================================

/// Ordered, closed set of job stages.
///
/// # Invariants
/// - Ordinals are contiguous from 0 (`InQueue`) to 6 (`Finished`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IngestionStage {
    /// Waiting for a worker.
    InQueue,
    /// First pass over file contents.
    ProcessingFileContentsPartOne,
    /// First pass over file metadata.
    ProcessingFileMetadataPartOne,
    /// Staged between passes.
    Staged,
    /// Second pass over file contents.
    ProcessingFileContentsPartTwo,
    /// Second pass over file metadata.
    ProcessingFileMetadataPartTwo,
    /// Terminal stage.
    Finished,
}

impl IngestionStage {
    /// All stages in order.
    pub const ALL: [Self; 7] = [
        Self::InQueue,
        Self::ProcessingFileContentsPartOne,
        Self::ProcessingFileMetadataPartOne,
        Self::Staged,
        Self::ProcessingFileContentsPartTwo,
        Self::ProcessingFileMetadataPartTwo,
        Self::Finished,
    ];

    /// Returns the human-readable stage name stored on records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InQueue => "In-queue",
            Self::ProcessingFileContentsPartOne => "Processing file contents, Part I",
            Self::ProcessingFileMetadataPartOne => "Processing file metadata, Part I",
            Self::Staged => "Staged",
            Self::ProcessingFileContentsPartTwo => "Processing file contents, Part II",
            Self::ProcessingFileMetadataPartTwo => "Processing file metadata, Part II",
            Self::Finished => "Finished",
        }
    }

    /// Returns the stage ordinal.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::InQueue => 0,
            Self::ProcessingFileContentsPartOne => 1,
            Self::ProcessingFileMetadataPartOne => 2,
            Self::Staged => 3,
            Self::ProcessingFileContentsPartTwo => 4,
            Self::ProcessingFileMetadataPartTwo => 5,
            Self::Finished => 6,
        }
    }

    /// Returns the following stage; the terminal stage maps to itself.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::InQueue => Self::ProcessingFileContentsPartOne,
            Self::ProcessingFileContentsPartOne => Self::ProcessingFileMetadataPartOne,
            Self::ProcessingFileMetadataPartOne => Self::Staged,
            Self::Staged => Self::ProcessingFileContentsPartTwo,
            Self::ProcessingFileContentsPartTwo => Self::ProcessingFileMetadataPartTwo,
            Self::ProcessingFileMetadataPartTwo | Self::Finished => Self::Finished,
        }
    }

    /// Returns true for the terminal stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordinal of the terminal stage, emitted as `num_stages`.
pub const NUM_STAGES: u8 = IngestionStage::Finished.ordinal();

// ============================================================================
// SECTION: Batches
// ============================================================================

/// Logical group of jobs sharing owner, repository, version, and priority.
///
/// # Invariants
/// - Immutable once created; jobs hold it behind an [`Arc`].
/// - `job_failure_rate` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionBatch {
    /// Batch identifier (`<repo>__<version>__<user>`).
    pub batch_id: String,
    /// Owning organization.
    pub org_id: String,
    /// Owning user.
    pub user_id: String,
    /// Repository identifier.
    pub repo_id: String,
    /// Repository version label.
    pub repo_version: String,
    /// Scheduling priority label.
    pub priority: String,
    /// Number of jobs in the batch.
    pub num_jobs: usize,
    /// Per-transition failure probability.
    pub job_failure_rate: f64,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
}

// ============================================================================
// SECTION: Jobs
// ============================================================================

/// One synthetic job progressing through stages.
///
/// # Invariants
/// - `stage` never decreases.
/// - Once `errored` is set the job never transitions again.
/// - `finished` is true iff the terminal stage was reached without error.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionJob {
    /// Owning batch.
    batch: Arc<IngestionBatch>,
    /// Stable job identifier.
    job_id: String,
    /// Job kind label.
    job_type: String,
    /// Dataset identifier.
    dataset_id: String,
    /// Current stage.
    stage: IngestionStage,
    /// Stage-entry time in epoch milliseconds.
    time_ms: i64,
    /// Failure flag.
    errored: bool,
    /// Completion flag.
    finished: bool,
}

impl IngestionJob {
    /// Creates a job at `In-queue` with explicit identifiers.
    #[must_use]
    pub const fn new(
        batch: Arc<IngestionBatch>,
        job_id: String,
        job_type: String,
        dataset_id: String,
        now_ms: i64,
    ) -> Self {
        Self {
            batch,
            job_id,
            job_type,
            dataset_id,
            stage: IngestionStage::InQueue,
            time_ms: now_ms,
            errored: false,
            finished: false,
        }
    }

    /// Creates a job at `In-queue` with random identifiers.
    pub fn random<R: Rng + ?Sized>(batch: Arc<IngestionBatch>, rng: &mut R, now_ms: i64) -> Self {
        let job_type = JOB_TYPES.choose(rng).copied().unwrap_or("ADD").to_string();
        let job_id = random_job_id(rng);
        let dataset_id = format!("{}_{}", random_upper(rng, 6), random_upper(rng, 4));
        Self::new(batch, job_id, job_type, dataset_id, now_ms)
    }

    /// Returns the owning batch.
    #[must_use]
    pub fn batch(&self) -> &IngestionBatch {
        &self.batch
    }

    /// Returns the job identifier.
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> IngestionStage {
        self.stage
    }

    /// Returns true when the job failed.
    #[must_use]
    pub const fn errored(&self) -> bool {
        self.errored
    }

    /// Returns true when the job reached the terminal stage cleanly.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Returns true when no further transition can occur.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.errored || self.finished
    }

    /// Advances the job one stage.
    ///
    /// No-op once the job has errored or finished. Non-terminal targets draw
    /// against the batch failure rate; the terminal target sets `finished`.
    pub fn transition_to_next_stage<R: Rng + ?Sized>(&mut self, rng: &mut R, now_ms: i64) {
        if self.is_done() {
            return;
        }
        self.time_ms = now_ms;
        self.stage = self.stage.next();
        if self.stage.is_terminal() {
            self.finished = true;
        } else {
            self.errored = rng.gen_range(0.0 .. 1.0) < self.batch.job_failure_rate;
        }
    }

    /// Serializes the current state into the flat record shape.
    #[must_use]
    pub fn as_record(&self) -> Record {
        let batch = &self.batch;
        Record::new()
            .with("ingestion_batch_id", FieldValue::Text(batch.batch_id.clone()))
            .with("org_id", FieldValue::Text(batch.org_id.clone()))
            .with("user_id", FieldValue::Text(batch.user_id.clone()))
            .with("repo_id", FieldValue::Text(batch.repo_id.clone()))
            .with("repo_version", FieldValue::Text(batch.repo_version.clone()))
            .with("priority", FieldValue::Text(batch.priority.clone()))
            .with("job_id", FieldValue::Text(self.job_id.clone()))
            .with("job_type", FieldValue::Text(self.job_type.clone()))
            .with("created_at", FieldValue::Timestamp(batch.created_at_ms))
            .with("dataset_id", FieldValue::Text(self.dataset_id.clone()))
            .with("num_stages", FieldValue::Integer(i64::from(NUM_STAGES)))
            .with("time", FieldValue::Timestamp(self.time_ms))
            .with("stage", FieldValue::Text(self.stage.name().to_string()))
            .with("stage_progress", FieldValue::Integer(i64::from(self.stage.ordinal())))
            .with("errored", FieldValue::Boolean(self.errored))
            .with("finished", FieldValue::Boolean(self.finished))
    }
}

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Organizations and their users.
const ORG_USERS: &[(&str, &[&str])] = &[
    ("1", &["0011", "0111", "1111", "1110", "1100"]),
    ("2", &["0001", "1000"]),
];
/// Fractions (numerator, denominator) of a batch pair assigned to the first user.
const USER_SPLITS: &[(usize, usize)] = &[(1, 10), (1, 4), (1, 2)];
/// Failure-rate choices per batch.
pub const FAILURE_RATES: &[f64] = &[0.0, 0.0001, 0.01];
/// Repository identifiers.
const REPO_IDS: &[&str] = &["16311212173", "16554252419", "16629121578"];
/// Priority labels.
const PRIORITIES: &[&str] = &["HIGH", "MEDIUM", "LOW"];
/// Job kind labels.
const JOB_TYPES: &[&str] = &["ADD", "UPDATE", "DELETE"];

/// Creates `batch.num_jobs` jobs at `In-queue`.
pub fn generate_jobs<R: Rng + ?Sized>(
    batch: &Arc<IngestionBatch>,
    rng: &mut R,
    now_ms: i64,
) -> Vec<IngestionJob> {
    (0 .. batch.num_jobs).map(|_| IngestionJob::random(Arc::clone(batch), rng, now_ms)).collect()
}

/// Builds two batches that share org, repository, version, and priority.
///
/// The total job count is drawn from `min_jobs ..= max_jobs` and split
/// between two users of the same organization; each batch draws its own
/// failure rate from `failure_rates`.
pub fn generate_batch_pair<R: Rng + ?Sized>(
    rng: &mut R,
    min_jobs: usize,
    max_jobs: usize,
    failure_rates: &[f64],
    now_ms: i64,
) -> (IngestionBatch, IngestionBatch) {
    let (org_id, users) = ORG_USERS.choose(rng).copied().unwrap_or(ORG_USERS[0]);
    let first_user = users.choose(rng).copied().unwrap_or("0001");
    let second_user = users.choose(rng).copied().unwrap_or("0001");
    let repo_id = REPO_IDS.choose(rng).copied().unwrap_or(REPO_IDS[0]);
    let priority = PRIORITIES.choose(rng).copied().unwrap_or("LOW");
    let repo_version = (now_ms / 1000).to_string();

    let num_jobs = if max_jobs > min_jobs { rng.gen_range(min_jobs ..= max_jobs) } else { min_jobs };
    let split = USER_SPLITS.choose(rng).copied().unwrap_or((1, 2));
    let first_jobs = split_count(num_jobs, split);
    let rates = if failure_rates.is_empty() { FAILURE_RATES } else { failure_rates };

    let mut make = |user: &str, jobs: usize| IngestionBatch {
        batch_id: format!("{repo_id}__{repo_version}__{user}"),
        org_id: org_id.to_string(),
        user_id: user.to_string(),
        repo_id: repo_id.to_string(),
        repo_version: repo_version.clone(),
        priority: priority.to_string(),
        num_jobs: jobs,
        job_failure_rate: rates.choose(rng).copied().unwrap_or(0.0),
        created_at_ms: now_ms,
    };
    let first = make(first_user, first_jobs);
    let second = make(second_user, num_jobs - first_jobs);
    (first, second)
}

/// Returns `total * numerator / denominator`, rounded down.
fn split_count(total: usize, (numerator, denominator): (usize, usize)) -> usize {
    total.saturating_mul(numerator) / denominator.max(1)
}

/// Returns a random version-4 UUID string.
fn random_job_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let high = rng.next_u64();
    let low = rng.next_u64();
    let value = ((u128::from(high) << 64) | u128::from(low)) & !(0xF000_u128 << 64) & !(0xC000_u128 << 48);
    let value = value | (0x4000_u128 << 64) | (0x8000_u128 << 48);
    let hex = format!("{value:032x}");
    format!("{}-{}-{}-{}-{}", &hex[.. 8], &hex[8 .. 12], &hex[12 .. 16], &hex[16 .. 20], &hex[20 ..])
}

/// Returns `len` random uppercase ASCII letters.
fn random_upper<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0 .. len).map(|_| char::from(rng.gen_range(b'A' ..= b'Z'))).collect()
}
