//! Species identity.
//!
//! Every node of the breeding graph is an [`Entity`]: one species, anchored
//! by a stable [`EntityId`]. The name and rarity travel with the entity as
//! payload for presentation; the reachability engine only looks at ids.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for name-derived species ids.
const SPECIES_NAMESPACE: Uuid = Uuid::from_u128(0x6c2f_0d4e_8a51_4b7e_9d13_52a0_c4f1_7e09);

/// Globally unique, stable species identifier.
///
/// # Examples
///
/// ```
/// use palreach::EntityId;
///
/// let a = EntityId::from_name("Lamball");
/// let b = EntityId::from_name("Lamball");
/// assert_eq!(a, b);
/// assert!(!a.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derives the ID of a species from its name.
    ///
    /// The same name always yields the same ID, across processes and runs.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&SPECIES_NAMESPACE, name.as_bytes()))
    }

    /// Creates an entity ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One species of the production universe.
///
/// Equality and hashing are by [`EntityId`] only, so two representatives of
/// the same species compare equal even if their payload differs.
///
/// # Examples
///
/// ```
/// use palreach::Entity;
///
/// let lamball = Entity::new("Lamball", 1);
/// assert_eq!(lamball.name, "Lamball");
/// assert_eq!(lamball, Entity::new("Lamball", 20));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,

    /// Display name.
    pub name: String,

    /// Rarity / breeding power. Opaque to the engine.
    #[serde(default)]
    pub rarity: u32,
}

impl Entity {
    /// Creates an entity whose ID is derived from its name.
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: u32) -> Self {
        let name = name.into();
        Self {
            id: EntityId::from_name(&name),
            name,
            rarity,
        }
    }

    /// Creates an entity with a specific ID.
    #[must_use]
    pub fn with_id(id: EntityId, name: impl Into<String>, rarity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            rarity,
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_random() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(!id1.is_nil());
    }

    #[test]
    fn test_entity_id_from_name_is_stable() {
        assert_eq!(EntityId::from_name("Cattiva"), EntityId::from_name("Cattiva"));
        assert_ne!(EntityId::from_name("Cattiva"), EntityId::from_name("cattiva"));
    }

    #[test]
    fn test_entity_equality_ignores_payload() {
        let a = Entity::new("Foxparks", 3);
        let b = Entity::with_id(a.id, "Foxparks (alpha)", 9);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_entity_serde_roundtrip_defaults_rarity() {
        let id = EntityId::from_name("Pengullet");
        let json = format!(r#"{{"id":"{id}","name":"Pengullet"}}"#);
        let entity: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(entity.id, id);
        assert_eq!(entity.rarity, 0);
    }
}
