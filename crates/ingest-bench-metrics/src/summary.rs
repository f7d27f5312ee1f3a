// crates/ingest-bench-metrics/src/summary.rs
// ============================================================================
// Module: Duration Summaries
// Description: Per backend and operation aggregates over samples.
// Purpose: Condense raw samples into the comparison a benchmark run reports.
// Dependencies: ingest-bench-core, serde
// ============================================================================

//! ## Overview
//! Samples are grouped by backend and operation. First-call samples are
//! reported separately so cold-start cost does not skew the warm mean.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use ingest_bench_core::Backend;
use ingest_bench_core::DurationSample;
use serde::Serialize;

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Aggregate timings of one backend operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationSummary {
    /// Backend measured.
    pub backend: Backend,
    /// Operation name.
    pub operation: String,
    /// Number of samples.
    pub count: usize,
    /// Records handled across all samples.
    pub total_records: u64,
    /// Fastest sample in milliseconds.
    pub min_ms: i64,
    /// Slowest sample in milliseconds.
    pub max_ms: i64,
    /// Mean over samples not flagged as first calls.
    pub warm_mean_ms: Option<f64>,
    /// Elapsed time of the first-call sample, when one exists.
    pub first_call_ms: Option<i64>,
}

/// Groups samples into summaries ordered by backend then operation.
#[must_use]
pub fn summarize(samples: &[DurationSample]) -> Vec<OperationSummary> {
    let mut groups: BTreeMap<(Backend, &str), Vec<&DurationSample>> = BTreeMap::new();
    for sample in samples {
        groups.entry((sample.backend, sample.operation.as_str())).or_default().push(sample);
    }
    groups
        .into_iter()
        .map(|((backend, operation), group)| {
            let warm: Vec<i64> =
                group.iter().filter(|sample| sample.is_first_call != Some(true)).map(|sample| sample.elapsed_ms).collect();
            let warm_mean_ms = if warm.is_empty() {
                None
            } else {
                #[allow(clippy::cast_precision_loss, reason = "Millisecond sums stay far below 2^52.")]
                let mean = warm.iter().sum::<i64>() as f64 / warm.len() as f64;
                Some(mean)
            };
            OperationSummary {
                backend,
                operation: operation.to_string(),
                count: group.len(),
                total_records: group.iter().filter_map(|sample| sample.num_records).sum(),
                min_ms: group.iter().map(|sample| sample.elapsed_ms).min().unwrap_or_default(),
                max_ms: group.iter().map(|sample| sample.elapsed_ms).max().unwrap_or_default(),
                warm_mean_ms,
                first_call_ms: group.iter().find(|sample| sample.is_first_call == Some(true)).map(|sample| sample.elapsed_ms),
            }
        })
        .collect()
}
