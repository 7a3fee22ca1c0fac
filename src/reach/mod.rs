//! Breeding reachability engine.
//!
//! Given an owned collection and a [`ProductionDatabase`], the engine
//! computes every species obtainable by repeatedly breeding anything already
//! reachable, until an iteration produces nothing new.
//!
//! Each iteration enumerates the candidate pairs over the current members,
//! evaluates them on a worker pool, and then merges the findings on the
//! calling thread. Iteration `k + 1` never starts before the merge of `k`
//! completes. The run terminates because the set only grows and the universe
//! is finite: every iteration that does not stop the loop adds at least one
//! id.

mod cancel;
mod config;
mod evaluator;
mod merge;
mod observer;
mod pairs;
mod precondition;
mod snapshot;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

pub use cancel::CancellationToken;
pub use config::EngineConfig;
pub use evaluator::evaluate_pair;
pub use merge::Discovery;
pub use observer::{IterationObserver, IterationRecorder, IterationStats, ReachSummary};
pub use pairs::{enumerate_pairs, pair_count, pairs_from, PairStrategy, Pairs};
pub use precondition::can_produce;
pub use snapshot::ReachableSet;

use crate::entity::{Entity, EntityId};
use crate::error::{ExecutionError, ReachResult};
use crate::production::ProductionDatabase;

use evaluator::BatchEvaluator;
use merge::ReachableState;

/// Computes reachable sets under a fixed configuration.
///
/// The engine holds no per-run state and can be shared between threads;
/// every call to [`compute`](Self::compute) is independent.
///
/// # Examples
///
/// ```
/// use palreach::{Entity, ProductionTable, ReachabilityEngine};
///
/// let lamball = Entity::new("Lamball", 1);
/// let chikipi = Entity::new("Chikipi", 2);
/// let db = ProductionTable::builder().rule(&lamball, &lamball, &chikipi).build()?;
///
/// let reachable = ReachabilityEngine::default().compute(&db, [lamball.clone(), lamball.clone()])?;
/// assert!(reachable.contains(chikipi.id));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Default)]
pub struct ReachabilityEngine {
    config: EngineConfig,
    observer: Option<Arc<dyn IterationObserver>>,
}

impl std::fmt::Debug for ReachabilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachabilityEngine")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ReachabilityEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> ReachResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: None,
        })
    }

    /// Attaches an iteration observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn IterationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes the closure of `owned` under `db`.
    ///
    /// `owned` may repeat a species; repeats only matter to the
    /// [`can_produce`] precondition. If that check fails the result is the
    /// distinct owned ids alone.
    ///
    /// # Errors
    /// - `ExecutionError::Database` if a lookup fails.
    /// - `ExecutionError::IterationLimitExceeded` / `Timeout` when the
    ///   configured limits are hit.
    pub fn compute<D, I>(&self, db: &D, owned: I) -> ReachResult<ReachableSet>
    where
        D: ProductionDatabase + ?Sized,
        I: IntoIterator<Item = Entity>,
    {
        self.run(db, owned.into_iter().collect(), None)
    }

    /// Like [`compute`](Self::compute), aborting with
    /// `ExecutionError::Cancelled` once `cancel` is set.
    ///
    /// The token is checked before every iteration.
    pub fn compute_cancellable<D, I>(&self, db: &D, owned: I, cancel: &CancellationToken) -> ReachResult<ReachableSet>
    where
        D: ProductionDatabase + ?Sized,
        I: IntoIterator<Item = Entity>,
    {
        self.run(db, owned.into_iter().collect(), Some(cancel))
    }

    fn run<D>(&self, db: &D, owned: Vec<Entity>, cancel: Option<&CancellationToken>) -> ReachResult<ReachableSet>
    where
        D: ProductionDatabase + ?Sized,
    {
        let started = Instant::now();
        let mut state = ReachableState::seeded(&owned);

        if !can_produce(&owned) {
            tracing::debug!(owned = owned.len(), "breeding precondition failed; returning owned set");
            let snapshot = state.into_snapshot(0, 0, false, started.elapsed());
            self.finish(&snapshot);
            return Ok(snapshot);
        }

        let evaluator = BatchEvaluator::from_config(&self.config);
        let strategy = self.config.pair_strategy;
        let timeout = self.config.timeout();

        let mut iteration: u32 = 0;
        let mut frontier = 0;
        let mut total_pairs = 0;

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::warn!(iteration = iteration + 1, "reachability run cancelled");
                return Err(ExecutionError::Cancelled {
                    iteration: iteration + 1,
                }
                .into());
            }
            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    tracing::warn!(iteration, timeout_ms = ?self.config.timeout_ms, "reachability run timed out");
                    return Err(ExecutionError::Timeout {
                        duration_ms: self.config.timeout_ms.unwrap_or_default(),
                    }
                    .into());
                }
            }
            if let Some(max_iterations) = self.config.max_iterations {
                if iteration >= max_iterations {
                    tracing::warn!(max_iterations, "reachability run hit iteration limit");
                    return Err(ExecutionError::IterationLimitExceeded { max_iterations }.into());
                }
            }

            iteration += 1;
            let iteration_started = Instant::now();
            let n = state.len();
            let pairs = match strategy {
                PairStrategy::Full => enumerate_pairs(n),
                PairStrategy::Frontier => pairs_from(n, frontier),
            };
            let pairs_evaluated = pairs.len();

            let found = evaluator.evaluate(db, state.members(), pairs)?;
            frontier = n;
            let new_entities = state.merge(iteration, found);
            total_pairs += pairs_evaluated;

            let stats = IterationStats {
                iteration,
                pairs_evaluated,
                new_entities,
                reachable_size: state.len(),
                elapsed: iteration_started.elapsed(),
            };
            tracing::debug!(
                iteration,
                pairs = pairs_evaluated,
                new = new_entities,
                reachable = stats.reachable_size,
                strategy = strategy.name(),
                "iteration merged"
            );
            if let Some(observer) = &self.observer {
                observer.on_iteration(&stats);
            }

            if new_entities == 0 {
                break;
            }
        }

        let snapshot = state.into_snapshot(iteration, total_pairs, true, started.elapsed());
        tracing::info!(
            iterations = iteration,
            pairs = total_pairs,
            reachable = snapshot.len(),
            produced = snapshot.discoveries().len(),
            "reachability fixed point reached"
        );
        self.finish(&snapshot);
        Ok(snapshot)
    }

    fn finish(&self, snapshot: &ReachableSet) {
        if let Some(observer) = &self.observer {
            observer.on_finish(&ReachSummary {
                iterations: snapshot.iterations(),
                pairs_evaluated: snapshot.pairs_evaluated(),
                reachable_size: snapshot.len(),
                precondition_passed: snapshot.precondition_passed(),
                elapsed: snapshot.elapsed(),
            });
        }
    }
}

/// Computes the reachable ids of `owned` with the default configuration.
///
/// # Examples
///
/// ```
/// use palreach::{compute_reachable, Entity, ProductionTable};
///
/// let a = Entity::new("A", 1);
/// let b = Entity::new("B", 1);
/// let e = Entity::new("E", 1);
/// // Only the (B, A) ordering is stored.
/// let db = ProductionTable::builder().rule(&b, &a, &e).build()?;
///
/// let ids = compute_reachable(&db, [a.clone(), b.clone()])?;
/// assert_eq!(ids.len(), 3);
/// assert!(ids.contains(&e.id));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compute_reachable<D, I>(db: &D, owned: I) -> ReachResult<HashSet<EntityId>>
where
    D: ProductionDatabase + ?Sized,
    I: IntoIterator<Item = Entity>,
{
    Ok(ReachabilityEngine::default().compute(db, owned)?.into_ids())
}
