//! In-memory production database.
//!
//! `ProductionTable` stores results per *ordered* parent pair exactly as
//! they were inserted. It is immutable once built and needs no locking to
//! be shared across evaluation workers.

use std::collections::HashMap;

use crate::entity::{Entity, EntityId};
use crate::error::ValidationError;
use crate::production::traits::{ProductionDatabase, ProductionResult, StorageError};

/// Immutable in-memory [`ProductionDatabase`].
#[derive(Debug, Clone, Default)]
pub struct ProductionTable {
    entities: HashMap<EntityId, Entity>,
    by_name: HashMap<String, EntityId>,
    rules: HashMap<(EntityId, EntityId), Vec<ProductionResult>>,
    rule_count: usize,
}

impl ProductionTable {
    /// Starts building a table.
    #[must_use]
    pub fn builder() -> ProductionTableBuilder {
        ProductionTableBuilder::default()
    }

    /// Looks up a species by display name (exact match).
    #[must_use]
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).and_then(|id| self.entities.get(id))
    }

    /// Looks up a species by ID.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// All known species, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of stored (ordered pair, child) rules.
    #[must_use]
    pub const fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Returns true if no rule is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rule_count == 0
    }
}

impl ProductionDatabase for ProductionTable {
    fn lookup(&self, parent_a: EntityId, parent_b: EntityId) -> Result<Vec<ProductionResult>, StorageError> {
        Ok(self.rules.get(&(parent_a, parent_b)).cloned().unwrap_or_default())
    }
}

/// Builder for [`ProductionTable`].
///
/// Validation happens in [`build`](Self::build), so a malformed table is
/// rejected before any reachability run can see it.
#[derive(Debug, Default)]
pub struct ProductionTableBuilder {
    entities: Vec<Entity>,
    rules: Vec<(EntityId, EntityId, EntityId, Option<f32>)>,
}

impl ProductionTableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a species.
    #[must_use]
    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Registers several species.
    #[must_use]
    pub fn entities(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.entities.extend(entities);
        self
    }

    /// Stores `(parent_a, parent_b) -> child` for this ordering only.
    ///
    /// Parents and child are registered as species if not already known.
    #[must_use]
    pub fn rule(self, parent_a: &Entity, parent_b: &Entity, child: &Entity) -> Self {
        self.push_rule(parent_a, parent_b, child, None)
    }

    /// Like [`rule`](Self::rule), carrying an outcome probability.
    #[must_use]
    pub fn rule_with_probability(self, parent_a: &Entity, parent_b: &Entity, child: &Entity, probability: f32) -> Self {
        self.push_rule(parent_a, parent_b, child, Some(probability))
    }

    /// Stores a rule between species already registered through [`entity`](Self::entity).
    #[must_use]
    pub fn rule_by_id(mut self, parent_a: EntityId, parent_b: EntityId, child: EntityId, probability: Option<f32>) -> Self {
        self.rules.push((parent_a, parent_b, child, probability));
        self
    }

    fn push_rule(mut self, parent_a: &Entity, parent_b: &Entity, child: &Entity, probability: Option<f32>) -> Self {
        for e in [parent_a, parent_b, child] {
            self.entities.push(e.clone());
        }
        self.rules.push((parent_a.id, parent_b.id, child.id, probability));
        self
    }

    /// Validates and freezes the table.
    ///
    /// # Errors
    /// - `EmptyEntityName` if a species has a blank name.
    /// - `ConflictingEntityId` if one name is registered under two ids.
    /// - `ConflictingEntityName` if one id is registered under two names.
    /// - `UnknownEntity` if a rule references an unregistered id.
    /// - `ProbabilityOutOfRange` for a probability outside `[0, 1]` or NaN.
    pub fn build(self) -> Result<ProductionTable, ValidationError> {
        let mut entities: HashMap<EntityId, Entity> = HashMap::with_capacity(self.entities.len());
        let mut by_name: HashMap<String, EntityId> = HashMap::with_capacity(self.entities.len());

        for entity in self.entities {
            if entity.name.trim().is_empty() {
                return Err(ValidationError::EmptyEntityName);
            }
            if let Some(&existing) = by_name.get(&entity.name) {
                if existing != entity.id {
                    return Err(ValidationError::ConflictingEntityId {
                        name: entity.name,
                        existing,
                        declared: entity.id,
                    });
                }
                continue;
            }
            if let Some(existing) = entities.get(&entity.id) {
                return Err(ValidationError::ConflictingEntityName {
                    id: entity.id,
                    existing: existing.name.clone(),
                    declared: entity.name,
                });
            }
            by_name.insert(entity.name.clone(), entity.id);
            entities.insert(entity.id, entity);
        }

        let mut rules: HashMap<(EntityId, EntityId), Vec<ProductionResult>> = HashMap::new();
        let mut rule_count = 0;
        for (a, b, c, probability) in self.rules {
            let known = |id: EntityId| {
                entities.get(&id).cloned().ok_or_else(|| ValidationError::UnknownEntity {
                    name: id.to_string(),
                })
            };
            known(a)?;
            known(b)?;
            let child = known(c)?;

            if let Some(p) = probability {
                if !(0.0..=1.0).contains(&p) || p.is_nan() {
                    return Err(ValidationError::ProbabilityOutOfRange { value: p });
                }
            }

            let results = rules.entry((a, b)).or_default();
            // Identical (pair, child) rules collapse into the first one.
            if results.iter().any(|r| r.child.id == c) {
                continue;
            }
            results.push(ProductionResult { child, probability });
            rule_count += 1;
        }

        Ok(ProductionTable {
            entities,
            by_name,
            rules,
            rule_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species() -> (Entity, Entity, Entity) {
        (Entity::new("Lamball", 1), Entity::new("Cattiva", 2), Entity::new("Chikipi", 3))
    }

    #[test]
    fn lookup_only_answers_the_stored_ordering() {
        let (a, b, c) = species();
        let table = ProductionTable::builder().rule(&a, &b, &c).build().unwrap();

        assert_eq!(table.lookup(a.id, b.id).unwrap(), vec![ProductionResult::new(c.clone())]);
        assert!(table.lookup(b.id, a.id).unwrap().is_empty());
        assert_eq!(table.rule_count(), 1);
    }

    #[test]
    fn missing_pair_is_empty_not_error() {
        let (a, b, _) = species();
        let table = ProductionTable::builder().entity(a.clone()).entity(b.clone()).build().unwrap();
        assert!(table.is_empty());
        assert!(table.lookup(a.id, b.id).unwrap().is_empty());
    }

    #[test]
    fn duplicate_rules_collapse() {
        let (a, b, c) = species();
        let table = ProductionTable::builder()
            .rule(&a, &b, &c)
            .rule_with_probability(&a, &b, &c, 0.5)
            .build()
            .unwrap();
        let results = table.lookup(a.id, b.id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].probability, None);
    }

    #[test]
    fn name_index_and_catalog() {
        let (a, b, c) = species();
        let table = ProductionTable::builder().rule(&a, &b, &c).build().unwrap();
        assert_eq!(table.entity_by_name("Cattiva").map(|e| e.id), Some(b.id));
        assert_eq!(table.entity(c.id).map(|e| e.rarity), Some(3));
        assert_eq!(table.entities().count(), 3);
        assert!(table.entity_by_name("Depresso").is_none());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let (a, b, c) = species();
        let err = ProductionTable::builder()
            .rule_with_probability(&a, &b, &c, 1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::ProbabilityOutOfRange { .. }));

        let err = ProductionTable::builder()
            .rule_with_probability(&a, &b, &c, f32::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::ProbabilityOutOfRange { .. }));
    }

    #[test]
    fn rejects_unknown_rule_entities() {
        let (a, b, c) = species();
        let err = ProductionTable::builder()
            .entity(a.clone())
            .entity(b.clone())
            .rule_by_id(a.id, b.id, c.id, None)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownEntity { .. }));
    }

    #[test]
    fn rejects_blank_and_conflicting_names() {
        let err = ProductionTable::builder().entity(Entity::new("  ", 0)).build().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyEntityName));

        let err = ProductionTable::builder()
            .entity(Entity::new("Lamball", 1))
            .entity(Entity::with_id(EntityId::new(), "Lamball", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::ConflictingEntityId { .. }));
    }

    #[test]
    fn rejects_one_id_under_two_names() {
        let id = EntityId::new();
        let err = ProductionTable::builder()
            .entity(Entity::with_id(id, "Direhowl", 5))
            .entity(Entity::with_id(id, "Direhowl Noct", 5))
            .build()
            .unwrap_err();
        let ValidationError::ConflictingEntityName { existing, declared, .. } = err else {
            panic!("expected ConflictingEntityName, got {err:?}");
        };
        assert_eq!(existing, "Direhowl");
        assert_eq!(declared, "Direhowl Noct");
    }

    #[test]
    fn repeated_registration_is_accepted() {
        let a = Entity::new("Lamball", 1);
        let table = ProductionTable::builder()
            .entity(a.clone())
            .rule(&a, &a, &a)
            .build()
            .unwrap();
        assert_eq!(table.entity_by_name("Lamball").map(|e| e.id), Some(a.id));
    }
}
