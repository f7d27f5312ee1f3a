// crates/ingest-bench-core/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Doubling backoff schedules and an adapter-wide cooldown gate.
// Purpose: Keep retry timing explicit, configurable, and bounded.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`BackoffPolicy`] yields delays `base, 2*base, 4*base, ...` and stops
//! once the next delay would exceed `max_delay`. Each top-level call builds a
//! fresh [`Backoff`] so no retry budget leaks across calls.
//!
//! A [`Cooldown`] lets one request impose a pause on later, unrelated
//! requests of the same adapter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Backoff
// ============================================================================

/// Doubling backoff schedule.
///
/// # Invariants
/// - Every yielded delay is at most `max_delay`.
/// - The schedule is finite whenever `base_delay` is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// First delay.
    pub base_delay: Duration,
    /// Largest delay that may still be slept.
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Builds a policy from millisecond values.
    #[must_use]
    pub const fn from_millis(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(max_ms),
        }
    }

    /// Starts a fresh schedule.
    #[must_use]
    pub const fn start(&self) -> Backoff {
        Backoff {
            next: self.base_delay,
            max: self.max_delay,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_millis(1_000, 60_000)
    }
}

/// Live backoff schedule for one request.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Delay to use on the next retry.
    next: Duration,
    /// Cap on any delay.
    max: Duration,
}

impl Backoff {
    /// Returns the next delay, or `None` once the schedule is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.next.is_zero() || self.next > self.max {
            return None;
        }
        let delay = self.next;
        self.next = self.next.saturating_mul(2);
        Some(delay)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_delay()
    }
}

// ============================================================================
// SECTION: Cooldown
// ============================================================================

/// Adapter-wide pause armed by one request and honored by later ones.
///
/// # Invariants
/// - Arming never shortens an existing pause.
#[derive(Debug, Default)]
pub struct Cooldown {
    /// Instant before which new requests must not start.
    until: Mutex<Option<Instant>>,
}

impl Cooldown {
    /// Creates an idle cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the pause to at least `duration` from now.
    pub fn arm(&self, duration: Duration) {
        let target = Instant::now() + duration;
        let mut guard = self.until.lock().unwrap_or_else(PoisonError::into_inner);
        match *guard {
            Some(existing) if existing >= target => {}
            _ => *guard = Some(target),
        }
    }

    /// Returns the remaining pause, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let guard = self.until.lock().unwrap_or_else(PoisonError::into_inner);
        guard.and_then(|until| until.checked_duration_since(Instant::now())).filter(|d| !d.is_zero())
    }

    /// Sleeps out any remaining pause and returns how long it slept.
    pub fn wait(&self) -> Duration {
        match self.remaining() {
            Some(remaining) => {
                thread::sleep(remaining);
                remaining
            }
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::BackoffPolicy;
    use super::Cooldown;

    #[test]
    fn default_schedule_doubles_until_sixty_units() {
        let delays: Vec<u64> = BackoffPolicy::from_millis(1, 60).start().map(|d| d.as_millis().try_into().unwrap_or(0)).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn default_policy_caps_each_delay_not_the_total() {
        let delays: Vec<Duration> = BackoffPolicy::default().start().collect();
        assert!(delays.iter().all(|delay| *delay <= Duration::from_secs(60)));
        assert_eq!(delays.iter().sum::<Duration>(), Duration::from_secs(63));
    }

    #[test]
    fn zero_base_never_retries() {
        assert_eq!(BackoffPolicy::from_millis(0, 60).start().count(), 0);
    }

    #[test]
    fn cooldown_is_idle_until_armed() {
        let cooldown = Cooldown::new();
        assert!(cooldown.remaining().is_none());
        cooldown.arm(Duration::from_millis(50));
        assert!(cooldown.remaining().is_some());
        cooldown.arm(Duration::from_millis(1));
        assert!(cooldown.remaining().unwrap_or_default() > Duration::from_millis(1));
    }
}
