//! Whether breeding is possible at all from the owned collection.
//!
//! Compatibility data is not available at this level, so the check is a
//! conservative heuristic: a lone instance of a single species cannot
//! breed; anything else is assumed able to. False positives are harmless
//! (the closure just finds nothing); false negatives would truncate it.

use std::collections::HashSet;

use crate::entity::{Entity, EntityId};

/// Returns true if the owned collection may produce offspring.
///
/// `owned` may contain the same species several times; each occurrence is
/// one instance.
///
/// # Examples
///
/// ```
/// use palreach::{can_produce, Entity};
///
/// let lamball = Entity::new("Lamball", 1);
/// assert!(!can_produce(&[lamball.clone()]));
/// assert!(can_produce(&[lamball.clone(), lamball]));
/// ```
#[must_use]
pub fn can_produce(owned: &[Entity]) -> bool {
    let total = owned.len();
    if total == 0 {
        return false;
    }
    let distinct: HashSet<EntityId> = owned.iter().map(|e| e.id).collect();
    !(distinct.len() == 1 && total < 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cannot_produce() {
        assert!(!can_produce(&[]));
    }

    #[test]
    fn single_instance_cannot_produce() {
        assert!(!can_produce(&[Entity::new("Depresso", 2)]));
    }

    #[test]
    fn two_instances_of_one_species_can_produce() {
        let d = Entity::new("Depresso", 2);
        assert!(can_produce(&[d.clone(), d]));
    }

    #[test]
    fn two_species_can_produce() {
        assert!(can_produce(&[Entity::new("Depresso", 2), Entity::new("Lamball", 1)]));
    }
}
