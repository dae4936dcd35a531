//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of an invoice creation saga in its lifecycle.
///
/// State transitions:
/// ```text
/// NotStarted ──► Started ──► InvoiceCreated ──► PdfStored
///                   │              │
///                   └──────────────┴──► Failed
/// ```
///
/// Transitions are strictly forward; a saga never regresses. The state is
/// derived purely by replaying the saga's journal records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// No journal records exist for this saga yet.
    #[default]
    NotStarted,

    /// The saga has been journaled but no step has completed.
    Started,

    /// Step 1 complete: the invoice record exists downstream.
    InvoiceCreated,

    /// Step 2 complete: the PDF is stored (terminal state).
    PdfStored,

    /// A step was rejected or exhausted its retries (terminal state).
    Failed,
}

impl SagaState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::PdfStored | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Started => "Started",
            SagaState::InvoiceCreated => "InvoiceCreated",
            SagaState::PdfStored => "PdfStored",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_not_started() {
        assert_eq!(SagaState::default(), SagaState::NotStarted);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SagaState::NotStarted.is_terminal());
        assert!(!SagaState::Started.is_terminal());
        assert!(!SagaState::InvoiceCreated.is_terminal());
        assert!(SagaState::PdfStored.is_terminal());
        assert!(SagaState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaState::NotStarted.to_string(), "NotStarted");
        assert_eq!(SagaState::Started.to_string(), "Started");
        assert_eq!(SagaState::InvoiceCreated.to_string(), "InvoiceCreated");
        assert_eq!(SagaState::PdfStored.to_string(), "PdfStored");
        assert_eq!(SagaState::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_serialization() {
        let state = SagaState::InvoiceCreated;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: SagaState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
