//! # palreach - breeding-graph reachability
//!
//! palreach answers one question: starting from the species you own, which
//! species can you eventually breed? Breeding is a symmetric pairwise
//! production relation, so the answer is the fixed-point closure of the owned
//! set under "combine any two reachable species, self-pairs included".
//!
//! ## Core Concepts
//!
//! - **Entity**: one species, identified by a stable [`EntityId`]
//! - **Production database**: `(parent, parent) -> children` lookup behind
//!   the [`ProductionDatabase`] trait
//! - **Reachable set**: the closure, returned as an immutable [`ReachableSet`]
//!
//! ## Usage
//!
//! ```rust
//! use palreach::{Entity, ProductionTable, ReachabilityEngine};
//!
//! let a = Entity::new("A", 1);
//! let b = Entity::new("B", 1);
//! let c = Entity::new("C", 2);
//! let d = Entity::new("D", 3);
//!
//! let db = ProductionTable::builder()
//!     .rule(&a, &b, &c)
//!     .rule(&c, &b, &d)
//!     .build()?;
//!
//! let reachable = ReachabilityEngine::default().compute(&db, [a, b])?;
//! assert_eq!(reachable.len(), 4);
//! assert!(reachable.contains(d.id));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod entity;
pub mod error;
pub mod production;
pub mod reach;

// Re-export primary types at crate root for convenience
pub use entity::{Entity, EntityId};
pub use error::{ExecutionError, ReachError, ReachResult, ValidationError};
pub use production::{
    EntityRecord, ProductionDatabase, ProductionResult, ProductionTable, ProductionTableBuilder,
    RuleRecord, RuleSet, StorageError,
};
pub use reach::{
    can_produce, compute_reachable, enumerate_pairs, evaluate_pair, CancellationToken, Discovery,
    EngineConfig, IterationObserver, IterationRecorder, IterationStats, PairStrategy,
    ReachSummary, ReachabilityEngine, ReachableSet,
};
