//! Iteration-boundary instrumentation.
//!
//! Observers are injected by the caller and invoked after each merge. They
//! see counters only; they cannot touch the reachable set.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Counters for one completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IterationStats {
    /// 1-based iteration number.
    pub iteration: u32,
    /// Pairs evaluated in this iteration.
    pub pairs_evaluated: usize,
    /// Ids added by this iteration's merge.
    pub new_entities: usize,
    /// Size of the reachable set after the merge.
    pub reachable_size: usize,
    /// Wall time spent on evaluation and merge.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

/// Totals for a run that reached its fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReachSummary {
    /// Iterations executed, including the final one that found nothing new.
    pub iterations: u32,
    /// Pairs evaluated across all iterations.
    pub pairs_evaluated: usize,
    /// Final reachable set size.
    pub reachable_size: usize,
    /// Whether the owned collection passed the breeding precondition.
    pub precondition_passed: bool,
    /// Total wall time.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().min(u128::from(u64::MAX)) as u64)
}

/// Receives iteration-boundary callbacks from the engine.
pub trait IterationObserver: Send + Sync {
    /// Called once per iteration, after its merge completed.
    fn on_iteration(&self, stats: &IterationStats);

    /// Called once when the run reached its fixed point.
    fn on_finish(&self, _summary: &ReachSummary) {}
}

impl<F> IterationObserver for F
where
    F: Fn(&IterationStats) + Send + Sync,
{
    fn on_iteration(&self, stats: &IterationStats) {
        self(stats);
    }
}

/// Observer that keeps every callback for later inspection.
#[derive(Debug, Default)]
pub struct IterationRecorder {
    iterations: Mutex<Vec<IterationStats>>,
    summary: Mutex<Option<ReachSummary>>,
}

impl IterationRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded iterations, in order.
    #[must_use]
    pub fn iterations(&self) -> Vec<IterationStats> {
        self.iterations.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// The final summary, if the run completed.
    #[must_use]
    pub fn summary(&self) -> Option<ReachSummary> {
        self.summary.lock().ok().and_then(|g| *g)
    }
}

impl IterationObserver for IterationRecorder {
    fn on_iteration(&self, stats: &IterationStats) {
        if let Ok(mut guard) = self.iterations.lock() {
            guard.push(*stats);
        }
    }

    fn on_finish(&self, summary: &ReachSummary) {
        if let Ok(mut guard) = self.summary.lock() {
            *guard = Some(*summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn stats(iteration: u32) -> IterationStats {
        IterationStats {
            iteration,
            pairs_evaluated: 3,
            new_entities: 1,
            reachable_size: 3,
            elapsed: Duration::from_millis(2),
        }
    }

    #[test]
    fn closures_are_observers() {
        let seen = AtomicUsize::new(0);
        let observer = |s: &IterationStats| {
            seen.fetch_add(s.pairs_evaluated, Ordering::Relaxed);
        };
        observer.on_iteration(&stats(1));
        observer.on_finish(&ReachSummary {
            iterations: 1,
            pairs_evaluated: 3,
            reachable_size: 3,
            precondition_passed: true,
            elapsed: Duration::ZERO,
        });
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn recorder_keeps_order() {
        let recorder = IterationRecorder::new();
        recorder.on_iteration(&stats(1));
        recorder.on_iteration(&stats(2));
        let its: Vec<u32> = recorder.iterations().iter().map(|s| s.iteration).collect();
        assert_eq!(its, vec![1, 2]);
        assert!(recorder.summary().is_none());
    }

    #[test]
    fn stats_serialize_elapsed_as_millis() {
        let json = serde_json::to_value(stats(1)).unwrap();
        assert_eq!(json["elapsed"], 2);
        assert_eq!(json["iteration"], 1);
    }
}
