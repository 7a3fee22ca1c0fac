//! Merge and convergence detection.
//!
//! `ReachableState` is the only mutable shared state of a run and the merge
//! step is its only writer. It runs on the calling thread after every worker
//! of the iteration has been joined, so no evaluation can observe or race a
//! partially merged set.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::entity::{Entity, EntityId};
use crate::reach::evaluator::Found;
use crate::reach::snapshot::ReachableSet;

/// How a produced species first entered the reachable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// The new species.
    pub entity: Entity,
    /// 1-based iteration whose merge added it.
    pub iteration: u32,
    /// The first parent pair, in enumeration order, that produced it.
    pub parents: (EntityId, EntityId),
}

/// Growing closure for a single run.
///
/// Invariants: ids are never removed, and `members` holds exactly one
/// representative per id, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct ReachableState {
    ids: HashSet<EntityId>,
    members: Vec<Entity>,
    owned: usize,
    discoveries: Vec<Discovery>,
}

impl ReachableState {
    /// Seeds the state with the distinct owned species.
    pub(crate) fn seeded(owned: &[Entity]) -> Self {
        let mut state = Self::default();
        for entity in owned {
            if state.ids.insert(entity.id) {
                state.members.push(entity.clone());
            }
        }
        state.owned = state.members.len();
        state
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Representatives available for pairing, in insertion order.
    pub(crate) fn members(&self) -> &[Entity] {
        &self.members
    }

    /// Folds one iteration's findings in; returns how many ids were new.
    ///
    /// Zero means the fixed point is reached.
    pub(crate) fn merge(&mut self, iteration: u32, found: Vec<Found>) -> usize {
        let before = self.members.len();
        for Found { parents, child } in found {
            if self.ids.insert(child.id) {
                self.members.push(child.clone());
                self.discoveries.push(Discovery {
                    entity: child,
                    iteration,
                    parents,
                });
            }
        }
        self.members.len() - before
    }

    pub(crate) fn into_snapshot(
        self,
        iterations: u32,
        pairs_evaluated: usize,
        precondition_passed: bool,
        elapsed: Duration,
    ) -> ReachableSet {
        ReachableSet {
            ids: self.ids,
            members: self.members,
            owned: self.owned,
            discoveries: self.discoveries,
            iterations,
            pairs_evaluated,
            precondition_passed,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(a: &Entity, b: &Entity, child: &Entity) -> Found {
        Found {
            parents: (a.id, b.id),
            child: child.clone(),
        }
    }

    #[test]
    fn seeding_dedups_owned_instances() {
        let a = Entity::new("A", 1);
        let b = Entity::new("B", 1);
        let state = ReachableState::seeded(&[a.clone(), a.clone(), b.clone()]);
        assert_eq!(state.len(), 2);
        assert_eq!(state.members(), &[a, b]);
    }

    #[test]
    fn merge_adds_only_new_ids() {
        let (a, b, c) = (Entity::new("A", 1), Entity::new("B", 1), Entity::new("C", 1));
        let mut state = ReachableState::seeded(&[a.clone(), b.clone()]);

        let added = state.merge(1, vec![found(&a, &b, &c), found(&b, &b, &c), found(&a, &a, &a)]);
        assert_eq!(added, 1);
        assert_eq!(state.len(), 3);

        assert_eq!(state.merge(2, vec![found(&a, &c, &c)]), 0);
    }

    #[test]
    fn first_finding_wins_provenance() {
        let (a, b, c) = (Entity::new("A", 1), Entity::new("B", 1), Entity::new("C", 1));
        let mut state = ReachableState::seeded(&[a.clone(), b.clone()]);
        state.merge(1, vec![found(&a, &b, &c), found(&b, &b, &c)]);

        let snapshot = state.into_snapshot(2, 6, true, Duration::ZERO);
        let discovery = &snapshot.discoveries()[0];
        assert_eq!(discovery.entity, c);
        assert_eq!(discovery.iteration, 1);
        assert_eq!(discovery.parents, (a.id, b.id));
    }
}
