//! Pair evaluation.
//!
//! [`evaluate_pair`] is the pure per-pair lookup. [`BatchEvaluator`] fans one
//! iteration's pairs out to a short-lived pool of named worker threads fed
//! through a bounded channel, then fans the per-chunk outcomes back in.
//! Workers never write shared state: each returns its own outcomes and the
//! caller merges them after every worker has been joined.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver};

use crate::entity::{Entity, EntityId};
use crate::error::{ExecutionError, ReachError, ReachResult};
use crate::production::{ProductionDatabase, StorageError};
use crate::reach::config::EngineConfig;
use crate::reach::pairs::Pairs;

/// Children produced by `parent_a` and `parent_b`, in either order.
///
/// Both `(a, b)` and `(b, a)` are queried because a database may store only
/// one ordering of a symmetric rule. The union is deduplicated by id,
/// keeping the first representative seen. A pair with no entry yields an
/// empty vector.
pub fn evaluate_pair<D>(db: &D, parent_a: &Entity, parent_b: &Entity) -> Result<Vec<Entity>, StorageError>
where
    D: ProductionDatabase + ?Sized,
{
    let mut forward = db.lookup(parent_a.id, parent_b.id)?;
    if parent_a.id != parent_b.id {
        forward.extend(db.lookup(parent_b.id, parent_a.id)?);
    }

    let mut seen: HashSet<EntityId> = HashSet::with_capacity(forward.len());
    Ok(forward
        .into_iter()
        .filter(|r| seen.insert(r.child.id))
        .map(|r| r.child)
        .collect())
}

/// A child found for a concrete parent pair.
#[derive(Debug, Clone)]
pub(crate) struct Found {
    pub parents: (EntityId, EntityId),
    pub child: Entity,
}

struct Job {
    seq: usize,
    pairs: Vec<(usize, usize)>,
}

struct ChunkOutcome {
    seq: usize,
    found: Vec<Found>,
}

/// Fan-out / fan-in evaluator for one iteration's pair batch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchEvaluator {
    workers: usize,
    chunk_size: usize,
    queue_capacity: usize,
    parallel_threshold: usize,
}

impl BatchEvaluator {
    pub(crate) fn from_config(config: &EngineConfig) -> Self {
        Self {
            workers: config.resolved_workers().max(1),
            chunk_size: config.chunk_size.max(1),
            queue_capacity: config.queue_capacity.max(1),
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Evaluates every pair, returning findings in pair-enumeration order.
    pub(crate) fn evaluate<D>(&self, db: &D, members: &[Entity], pairs: Pairs) -> ReachResult<Vec<Found>>
    where
        D: ProductionDatabase + ?Sized,
    {
        let total = pairs.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        let chunks = total.div_ceil(self.chunk_size);
        let workers = self.workers.min(chunks);
        if workers <= 1 || total < self.parallel_threshold {
            return Ok(evaluate_chunk(db, members, pairs)?);
        }
        self.evaluate_parallel(db, members, pairs, workers)
    }

    fn evaluate_parallel<D>(&self, db: &D, members: &[Entity], mut pairs: Pairs, workers: usize) -> ReachResult<Vec<Found>>
    where
        D: ProductionDatabase + ?Sized,
    {
        let failed = AtomicBool::new(false);

        let mut outcomes = thread::scope(|scope| -> ReachResult<Vec<ChunkOutcome>> {
            let (tx, rx) = bounded::<Job>(self.queue_capacity);

            let mut handles = Vec::with_capacity(workers);
            for idx in 0..workers {
                let rx: Receiver<Job> = rx.clone();
                let failed = &failed;
                let handle = thread::Builder::new()
                    .name(format!("palreach-eval-{idx}"))
                    .spawn_scoped(scope, move || worker_loop(idx, db, members, &rx, failed))
                    .map_err(|e| ExecutionError::WorkerSpawn {
                        message: e.to_string(),
                    })?;
                handles.push(handle);
            }
            // Only workers hold receivers now; if they all stop, `send` fails.
            drop(rx);

            let mut seq = 0;
            loop {
                let chunk: Vec<(usize, usize)> = pairs.by_ref().take(self.chunk_size).collect();
                if chunk.is_empty() {
                    break;
                }
                if tx.send(Job { seq, pairs: chunk }).is_err() {
                    break;
                }
                seq += 1;
            }
            drop(tx);

            let mut outcomes = Vec::with_capacity(seq);
            let mut first_err: Option<ReachError> = None;
            for (idx, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(Ok(mut done)) => outcomes.append(&mut done),
                    Ok(Err(e)) => {
                        first_err.get_or_insert_with(|| e.into());
                    }
                    Err(_) => {
                        first_err.get_or_insert(ReachError::Execution(ExecutionError::WorkerPanicked { worker: idx }));
                    }
                }
            }
            match first_err {
                Some(e) => Err(e),
                None => Ok(outcomes),
            }
        })?;

        outcomes.sort_unstable_by_key(|o| o.seq);
        Ok(outcomes.into_iter().flat_map(|o| o.found).collect())
    }
}

fn worker_loop<D>(
    idx: usize,
    db: &D,
    members: &[Entity],
    rx: &Receiver<Job>,
    failed: &AtomicBool,
) -> Result<Vec<ChunkOutcome>, StorageError>
where
    D: ProductionDatabase + ?Sized,
{
    tracing::trace!(worker = idx, "evaluation worker started");
    let mut done = Vec::new();
    while let Ok(job) = rx.recv() {
        if failed.load(Ordering::Relaxed) {
            break;
        }
        match evaluate_chunk(db, members, job.pairs.into_iter()) {
            Ok(found) => done.push(ChunkOutcome { seq: job.seq, found }),
            Err(e) => {
                failed.store(true, Ordering::Relaxed);
                tracing::trace!(worker = idx, error = %e, "evaluation worker failed");
                return Err(e);
            }
        }
    }
    tracing::trace!(worker = idx, chunks = done.len(), "evaluation worker finished");
    Ok(done)
}

fn evaluate_chunk<D, I>(db: &D, members: &[Entity], pairs: I) -> Result<Vec<Found>, StorageError>
where
    D: ProductionDatabase + ?Sized,
    I: Iterator<Item = (usize, usize)>,
{
    let mut found = Vec::new();
    for (i, j) in pairs {
        let (a, b) = (&members[i], &members[j]);
        for child in evaluate_pair(db, a, b)? {
            found.push(Found {
                parents: (a.id, b.id),
                child,
            });
        }
    }
    Ok(found)
}
