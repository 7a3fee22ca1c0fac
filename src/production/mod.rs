//! Production database: who breeds into what.
//!
//! The engine only depends on the [`ProductionDatabase`] trait. This module
//! also ships an immutable in-memory table and a JSON rule-set format for
//! embedded use, tests and the CLI.

mod rules;
mod table;
mod traits;

pub use rules::{EntityRecord, RuleRecord, RuleSet};
pub use table::{ProductionTable, ProductionTableBuilder};
pub use traits::{ProductionDatabase, ProductionResult, StorageError};
