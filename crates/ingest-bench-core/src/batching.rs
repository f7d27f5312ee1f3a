// crates/ingest-bench-core/src/batching.rs
// ============================================================================
// Module: Batching
// Description: Order-preserving sub-batch splitting and a bounded worker pool.
// Purpose: Share the chunking and fan-out mechanics used by every adapter.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`split_into_batches`] cuts an ordered sequence into fixed-size chunks.
//! [`run_bounded`] executes independent jobs on at most `workers` scoped
//! threads, stops handing out new jobs after the first failure, and reports
//! every failure observed rather than only the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;

// ============================================================================
// SECTION: Splitting
// ============================================================================

/// Splits `items` into order-preserving chunks of `size` elements.
///
/// The last chunk may be shorter. A `size` of zero is treated as one so the
/// call is total. An empty input yields no chunks.
#[must_use]
pub fn split_into_batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));
    for item in items {
        current.push(item);
        if current.len() == size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

// ============================================================================
// SECTION: Worker Pool
// ============================================================================

/// Failure report from [`run_bounded`].
///
/// # Invariants
/// - `first` is the earliest failure recorded by any worker.
/// - `additional` holds every later failure in completion order.
#[derive(Debug)]
pub struct PoolFailure<E> {
    /// First failure observed.
    pub first: E,
    /// Failures observed after the first.
    pub additional: Vec<E>,
}

impl<E> PoolFailure<E> {
    /// Returns the total number of failures.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.additional.len()
    }
}

/// Runs `job` over `items` on at most `workers` threads.
///
/// Results are returned in input order. Once any job fails no further items
/// are started; jobs already in flight complete and their failures are kept.
///
/// # Errors
///
/// Returns [`PoolFailure`] when at least one job fails.
pub fn run_bounded<T, R, E, F>(items: Vec<T>, workers: usize, job: F) -> Result<Vec<R>, PoolFailure<E>>
where
    T: Send,
    R: Send,
    E: Send,
    F: Fn(T) -> Result<R, E> + Sync,
{
    let total = items.len();
    let queue: Mutex<VecDeque<(usize, T)>> = Mutex::new(items.into_iter().enumerate().collect());
    let results: Mutex<Vec<Option<R>>> = Mutex::new((0 .. total).map(|_| None).collect());
    let failures: Mutex<Vec<E>> = Mutex::new(Vec::new());
    let aborted = AtomicBool::new(false);
    let workers = workers.clamp(1, total.max(1));

    thread::scope(|scope| {
        for _ in 0 .. workers {
            scope.spawn(|| {
                loop {
                    if aborted.load(Ordering::Acquire) {
                        break;
                    }
                    let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
                    let Some((index, item)) = next else {
                        break;
                    };
                    match job(item) {
                        Ok(value) => {
                            let mut guard = results.lock().unwrap_or_else(PoisonError::into_inner);
                            if let Some(slot) = guard.get_mut(index) {
                                *slot = Some(value);
                            }
                        }
                        Err(err) => {
                            aborted.store(true, Ordering::Release);
                            failures.lock().unwrap_or_else(PoisonError::into_inner).push(err);
                        }
                    }
                }
            });
        }
    });

    let mut failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
    if !failures.is_empty() {
        let first = failures.remove(0);
        return Err(PoolFailure {
            first,
            additional: failures,
        });
    }
    Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner).into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::run_bounded;
    use super::split_into_batches;

    #[test]
    fn split_handles_exact_and_ragged_tails() {
        assert_eq!(split_into_batches((0 .. 6).collect(), 3), vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(split_into_batches((0 .. 5).collect(), 2), vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert!(split_into_batches(Vec::<u8>::new(), 4).is_empty());
    }

    #[test]
    fn pool_preserves_input_order() {
        let out = run_bounded((0 .. 50).collect(), 10, |n: u32| Ok::<_, String>(n * 2)).unwrap();
        assert_eq!(out, (0 .. 50).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn pool_reports_first_failure_and_keeps_the_rest() {
        let started = AtomicUsize::new(0);
        let failure = run_bounded((0 .. 20).collect(), 1, |n: u32| {
            started.fetch_add(1, Ordering::SeqCst);
            if n == 3 { Err(format!("boom {n}")) } else { Ok(n) }
        })
        .unwrap_err();
        assert_eq!(failure.first, "boom 3");
        assert_eq!(failure.count(), 1);
        assert_eq!(started.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn pool_keeps_every_in_flight_failure() {
        let both_running = Barrier::new(2);
        let failure = run_bounded(vec![1, 2], 2, |n: u32| {
            both_running.wait();
            Err::<u32, _>(format!("boom {n}"))
        })
        .unwrap_err();
        assert_eq!(failure.count(), 2);
        let mut messages: Vec<String> = failure.additional.clone();
        messages.push(failure.first.clone());
        messages.sort();
        assert_eq!(messages, vec!["boom 1".to_string(), "boom 2".to_string()]);
    }
}
