//! Abstract production-database contract.
//!
//! The reachability engine consumes a fully built, read-only database
//! through this trait. Implementations answer a lookup for exactly the
//! ordering they were asked about; symmetrization is the engine's job,
//! since a provider may only populate one of `(a, b)` and `(b, a)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Entity, EntityId};

/// Errors a production-database backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is temporarily unable to answer.
    #[error("Production database unavailable: {0}")]
    Unavailable(String),

    /// The backend holds data that cannot be interpreted.
    #[error("Production database corrupted: {0}")]
    Corrupted(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    /// Returns true if retrying the same lookup may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// One outcome of combining two parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionResult {
    /// The produced species.
    pub child: Entity,

    /// Optional likelihood of this outcome. Never consulted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
}

impl ProductionResult {
    /// Creates a result without probability metadata.
    #[must_use]
    pub fn new(child: Entity) -> Self {
        Self {
            child,
            probability: None,
        }
    }
}

/// Read-only lookup of the children produced by an ordered parent pair.
///
/// # Contract
/// - A missing entry is `Ok(vec![])`, never an error.
/// - Implementations must be safe to query from many threads at once.
pub trait ProductionDatabase: Send + Sync {
    /// Returns the results stored for the ordered pair `(parent_a, parent_b)`.
    fn lookup(&self, parent_a: EntityId, parent_b: EntityId) -> Result<Vec<ProductionResult>, StorageError>;
}

impl<T: ProductionDatabase + ?Sized> ProductionDatabase for &T {
    fn lookup(&self, parent_a: EntityId, parent_b: EntityId) -> Result<Vec<ProductionResult>, StorageError> {
        (**self).lookup(parent_a, parent_b)
    }
}

impl<T: ProductionDatabase + ?Sized> ProductionDatabase for Arc<T> {
    fn lookup(&self, parent_a: EntityId, parent_b: EntityId) -> Result<Vec<ProductionResult>, StorageError> {
        (**self).lookup(parent_a, parent_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<ProductionResult>);

    impl ProductionDatabase for Fixed {
        fn lookup(&self, _: EntityId, _: EntityId) -> Result<Vec<ProductionResult>, StorageError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn blanket_impls_forward() {
        let child = Entity::new("Chikipi", 1);
        let db = Arc::new(Fixed(vec![ProductionResult::new(child.clone())]));
        let a = EntityId::from_name("a");

        let by_arc: &dyn ProductionDatabase = &db;
        assert_eq!(by_arc.lookup(a, a).unwrap()[0].child, child);

        let by_ref = &*db;
        assert_eq!((&by_ref).lookup(a, a).unwrap().len(), 1);
    }

    #[test]
    fn transient_classification() {
        assert!(StorageError::Unavailable("x".into()).is_transient());
        assert!(!StorageError::Corrupted("x".into()).is_transient());
        assert!(!StorageError::BackendError("x".into()).is_transient());
    }
}
