//! Engine configuration.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::reach::pairs::PairStrategy;

/// Reachability engine configuration.
///
/// Missing fields deserialize to their defaults, so a partial JSON object
/// such as `{"workers": 4}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluation workers per iteration. `0` uses the host's available parallelism.
    pub workers: usize,
    /// Pairs per work unit handed to a worker.
    pub chunk_size: usize,
    /// Maximum queued work units.
    pub queue_capacity: usize,
    /// Batches with fewer pairs than this are evaluated on the calling thread.
    pub parallel_threshold: usize,
    /// Abort once this many iterations ran without converging.
    ///
    /// The final pass that finds nothing new counts as an iteration, so a
    /// closure discovered in `k` productive iterations needs at least `k + 1`.
    pub max_iterations: Option<u32>,
    /// Abort once this much wall time elapsed, checked between iterations.
    pub timeout_ms: Option<u64>,
    /// Which pairs each iteration evaluates.
    pub pair_strategy: PairStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_size: 256,
            queue_capacity: 64,
            parallel_threshold: 512,
            max_iterations: None,
            timeout_ms: None,
            pair_strategy: PairStrategy::Full,
        }
    }
}

impl EngineConfig {
    /// Configuration that never spawns worker threads.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("queue_capacity", "must be at least 1"));
        }
        if self.max_iterations == Some(0) {
            return Err(invalid("max_iterations", "must be at least 1 when set"));
        }
        if self.timeout_ms == Some(0) {
            return Err(invalid("timeout_ms", "must be at least 1 when set"));
        }
        Ok(())
    }

    /// Worker count with `0` resolved against the host.
    #[must_use]
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }

    /// The timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::sequential().validate().is_ok());
    }

    #[test]
    fn auto_workers_resolve_to_at_least_one() {
        assert!(EngineConfig::default().resolved_workers() >= 1);
        assert_eq!(EngineConfig::sequential().resolved_workers(), 1);
    }

    #[test]
    fn rejects_zero_sizes() {
        let cfg = EngineConfig {
            chunk_size: 0,
            ..EngineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        let ValidationError::InvalidConfig { field, .. } = err else {
            panic!("expected InvalidConfig, got {err:?}");
        };
        assert_eq!(field, "chunk_size");

        let cfg = EngineConfig {
            max_iterations: Some(0),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"workers": 3, "pair_strategy": "frontier", "timeout_ms": 250}"#).unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.pair_strategy, PairStrategy::Frontier);
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.chunk_size, EngineConfig::default().chunk_size);
    }
}
