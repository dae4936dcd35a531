//! Saga error types.

use common::SagaId;
use journal::JournalError;
use thiserror::Error;

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A saga step was rejected or exhausted its retries.
    #[error("Saga step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    /// The saga is terminally failed; replayed without remote calls.
    #[error("Saga failed: {reason}")]
    SagaFailed { reason: String },

    /// The saga is complete but its result was not recorded.
    #[error("Saga {0} completed without a recorded result")]
    MissingResult(SagaId),

    /// The in-flight execution ended without reporting an outcome.
    #[error("Saga execution for {0} was aborted")]
    ExecutionAborted(SagaId),

    /// The execution failed on the journal or serialization, not on the
    /// downstream service. Reported by attached callers, which only see
    /// the broadcast outcome.
    #[error("Internal saga error: {0}")]
    Internal(String),

    /// Journal error.
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
