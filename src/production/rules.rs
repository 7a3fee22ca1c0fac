//! JSON rule-set documents.
//!
//! A rule set names species once and then refers to them by name:
//!
//! ```json
//! {
//!   "entities": [{ "name": "Lamball", "rarity": 1 }, { "name": "Chikipi" }],
//!   "rules": [{ "parents": ["Lamball", "Lamball"], "child": "Chikipi", "probability": 0.5 }]
//! }
//! ```
//!
//! Ids are derived from names unless an entity record pins one explicitly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::error::ValidationError;
use crate::production::table::ProductionTable;

/// A species declaration inside a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name, also the key rules refer to.
    pub name: String,

    /// Rarity payload.
    #[serde(default)]
    pub rarity: u32,

    /// Explicit ID; defaults to the name-derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
}

impl EntityRecord {
    fn into_entity(self) -> Entity {
        match self.id {
            Some(id) => Entity::with_id(id, self.name, self.rarity),
            None => Entity::new(self.name, self.rarity),
        }
    }
}

/// One `(parent, parent) -> child` rule, stored for the given ordering only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Ordered parent names.
    pub parents: [String; 2],

    /// Child name.
    pub child: String,

    /// Optional outcome probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
}

/// Serializable production rule document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Declared species.
    #[serde(default)]
    pub entities: Vec<EntityRecord>,

    /// Production rules.
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

impl RuleSet {
    /// Parses a rule set from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(text).map_err(|e| ValidationError::MalformedRuleSet {
            reason: e.to_string(),
        })
    }

    /// Serializes the rule set as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::MalformedRuleSet {
            reason: e.to_string(),
        })
    }

    /// Resolves names and builds a validated [`ProductionTable`].
    ///
    /// Every name a rule mentions must be declared in `entities`.
    pub fn into_table(self) -> Result<ProductionTable, ValidationError> {
        let entities: Vec<Entity> = self.entities.into_iter().map(EntityRecord::into_entity).collect();

        let mut index: HashMap<&str, EntityId> = HashMap::with_capacity(entities.len());
        for e in &entities {
            index.entry(e.name.as_str()).or_insert(e.id);
        }
        let resolve = |name: &str| {
            index.get(name).copied().ok_or_else(|| ValidationError::UnknownEntity {
                name: name.to_string(),
            })
        };

        let mut resolved = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let [a, b] = &rule.parents;
            resolved.push((resolve(a)?, resolve(b)?, resolve(&rule.child)?, rule.probability));
        }

        resolved
            .into_iter()
            .fold(ProductionTable::builder().entities(entities), |builder, (a, b, c, p)| {
                builder.rule_by_id(a, b, c, p)
            })
            .build()
    }
}
