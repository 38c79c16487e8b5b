//! Shared search budget with a wall-clock cutoff.
//!
//! A budget is an atomic counter of work units. MCTS consumes one unit per
//! iteration and stops once the counter reaches zero. Minimax consumes nothing:
//! it runs on an unbounded counter and only polls for exhaustion, so the timer
//! (or an explicit cancel) is what stops it.
//! A housekeeping thread enforces the time slice by setting the counter to zero
//! when the slice elapses; it exits early once every handle to the budget is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use tracing::trace;

#[derive(Clone, Debug)]
pub struct Budget {
    remaining: Arc<AtomicU64>,
    started: Instant,
    deadline: Option<Instant>,
    _timer: Option<Sender<()>>,
}

impl Budget {
    /// A budget of `units` with no time limit.
    pub fn new(units: u64) -> Self {
        Self {
            remaining: Arc::new(AtomicU64::new(units)),
            started: Instant::now(),
            deadline: None,
            _timer: None,
        }
    }

    /// A budget of `units` that is zeroed once `slice` has elapsed.
    pub fn with_timeout(units: u64, slice: Duration) -> Self {
        let remaining = Arc::new(AtomicU64::new(units));
        let (alive_tx, alive_rx) = bounded::<()>(0);
        let counter = Arc::clone(&remaining);

        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = alive_rx.recv_timeout(slice) {
                trace!(?slice, "search time slice elapsed");
                counter.store(0, Ordering::Release);
            }
        });

        let started = Instant::now();
        Self {
            remaining,
            started,
            deadline: Some(started + slice),
            _timer: Some(alive_tx),
        }
    }

    /// Take one unit. Returns false once the budget is exhausted.
    pub fn consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }

    /// Stop every search polling this budget.
    pub fn cancel(&self) {
        self.remaining.store(0, Ordering::Release);
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_counts_down() {
        let budget = Budget::new(3);
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_timeout_zeroes_budget() {
        let budget = Budget::with_timeout(u64::MAX, Duration::from_millis(20));
        assert!(budget.consume());
        thread::sleep(Duration::from_millis(200));
        assert!(budget.is_exhausted());
        assert!(!budget.consume());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let budget = Budget::new(100);
        let other = budget.clone();
        other.cancel();
        assert!(budget.is_exhausted());
    }
}
