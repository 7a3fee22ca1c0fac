//! Immutable result of a reachability run.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::entity::{Entity, EntityId};
use crate::reach::merge::Discovery;

/// Fixed-point closure of an owned collection.
///
/// Always contains every owned id. The order of [`entities`](Self::entities)
/// and [`discoveries`](Self::discoveries) is deterministic for a given
/// database, owned sequence and configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ReachableSet {
    #[serde(skip)]
    pub(crate) ids: HashSet<EntityId>,
    #[serde(rename = "entities")]
    pub(crate) members: Vec<Entity>,
    #[serde(skip)]
    pub(crate) owned: usize,
    pub(crate) discoveries: Vec<Discovery>,
    pub(crate) iterations: u32,
    pub(crate) pairs_evaluated: usize,
    pub(crate) precondition_passed: bool,
    #[serde(skip)]
    pub(crate) elapsed: Duration,
}

impl ReachableSet {
    /// Returns true if `id` is reachable.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of reachable species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is reachable (empty owned input).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reachable ids.
    #[must_use]
    pub const fn ids(&self) -> &HashSet<EntityId> {
        &self.ids
    }

    /// Consumes the snapshot, keeping only the ids.
    #[must_use]
    pub fn into_ids(self) -> HashSet<EntityId> {
        self.ids
    }

    /// One representative per reachable id: owned species first, then
    /// produced ones in discovery order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.members
    }

    /// Produced species with the iteration and parents that first yielded them.
    #[must_use]
    pub fn discoveries(&self) -> &[Discovery] {
        &self.discoveries
    }

    /// Reachable species that were not owned.
    pub fn newly_reachable(&self) -> impl Iterator<Item = &Entity> {
        self.members[self.owned..].iter()
    }

    /// Iterations executed, including the final pass that found nothing.
    /// Zero when the precondition failed.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Pairs evaluated across all iterations.
    #[must_use]
    pub const fn pairs_evaluated(&self) -> usize {
        self.pairs_evaluated
    }

    /// Whether the owned collection passed the breeding precondition.
    #[must_use]
    pub const fn precondition_passed(&self) -> bool {
        self.precondition_passed
    }

    /// Wall time of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
