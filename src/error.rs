//! Error types for palreach.
//!
//! All errors in palreach are strongly typed using thiserror.
//! Lookup misses and empty owned sets are not errors; only malformed
//! input, aborted runs and failing database backends surface here.

use thiserror::Error;

use crate::entity::EntityId;
use crate::production::StorageError;

/// Validation errors that occur while checking input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Probability value {value} is out of range [0.0, 1.0]")]
    ProbabilityOutOfRange {
        value: f32,
    },

    #[error("Entity name cannot be empty")]
    EmptyEntityName,

    #[error("Unknown entity: '{name}'")]
    UnknownEntity {
        name: String,
    },

    #[error("Entity '{name}' is declared with conflicting ids ({existing} vs {declared})")]
    ConflictingEntityId {
        name: String,
        existing: EntityId,
        declared: EntityId,
    },

    #[error("Entity {id} is declared under conflicting names ('{existing}' vs '{declared}')")]
    ConflictingEntityName {
        id: EntityId,
        existing: String,
        declared: String,
    },

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Malformed rule set: {reason}")]
    MalformedRuleSet {
        reason: String,
    },
}

/// Execution errors that abort a reachability run.
///
/// An aborted run never exposes a partial reachable set.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Computation cancelled before iteration {iteration}")]
    Cancelled {
        iteration: u32,
    },

    #[error("Computation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Iteration limit exceeded (max: {max_iterations})")]
    IterationLimitExceeded {
        max_iterations: u32,
    },

    #[error("Failed to spawn evaluation worker: {message}")]
    WorkerSpawn {
        message: String,
    },

    #[error("Evaluation worker {worker} panicked")]
    WorkerPanicked {
        worker: usize,
    },

    #[error("Production database error: {0}")]
    Database(#[from] StorageError),
}

/// Top-level error type for palreach.
#[derive(Debug, Error)]
pub enum ReachError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl From<StorageError> for ReachError {
    fn from(err: StorageError) -> Self {
        Self::Execution(ExecutionError::Database(err))
    }
}

impl ReachError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if the run was cancelled through a token.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Execution(ExecutionError::Cancelled { .. }))
    }

    /// Returns true if this error is retryable.
    ///
    /// Runs are deterministic, so only a transient database failure can
    /// turn out differently on a second attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(ExecutionError::Database(inner)) => inner.is_transient(),
            _ => false,
        }
    }
}

/// Result type alias for palreach operations.
pub type ReachResult<T> = Result<T, ReachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_probability() {
        let err = ValidationError::ProbabilityOutOfRange { value: 1.5 };
        let msg = format!("{err}");
        assert!(msg.contains("1.5"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_validation_error_unknown_entity() {
        let err = ValidationError::UnknownEntity {
            name: "Lamball".to_string(),
        };
        assert!(format!("{err}").contains("Lamball"));
    }

    #[test]
    fn test_execution_error_timeout() {
        let err = ExecutionError::Timeout { duration_ms: 5000 };
        let msg = format!("{err}");
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn test_execution_error_iteration_limit() {
        let err = ExecutionError::IterationLimitExceeded { max_iterations: 12 };
        assert!(format!("{err}").contains("12"));
    }

    #[test]
    fn test_reach_error_from_validation() {
        let reach_err: ReachError = ValidationError::EmptyEntityName.into();
        assert!(reach_err.is_validation());
        assert!(!reach_err.is_retryable());
    }

    #[test]
    fn test_reach_error_cancelled() {
        let reach_err: ReachError = ExecutionError::Cancelled { iteration: 3 }.into();
        assert!(reach_err.is_execution());
        assert!(reach_err.is_cancelled());
        assert!(!reach_err.is_retryable());
    }

    #[test]
    fn test_reach_error_from_storage() {
        let transient: ReachError = StorageError::Unavailable("replica down".to_string()).into();
        assert!(transient.is_execution());
        assert!(transient.is_retryable());

        let corrupt: ReachError = StorageError::Corrupted("bad key".to_string()).into();
        assert!(!corrupt.is_retryable());
        assert!(format!("{corrupt}").contains("bad key"));
    }

    #[test]
    fn test_reach_error_timeout_not_retryable() {
        let reach_err: ReachError = ExecutionError::Timeout { duration_ms: 1 }.into();
        assert!(reach_err.is_execution());
        assert!(!reach_err.is_retryable());

        let limit: ReachError = ExecutionError::IterationLimitExceeded { max_iterations: 4 }.into();
        assert!(!limit.is_retryable());
    }
}
