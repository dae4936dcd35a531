//! Saga journal events.

use chrono::{DateTime, Utc};
use common::{SagaId, TenantId, UserId};
use serde::{Deserialize, Serialize};

use crate::request::InvoiceRequest;

/// Events journaled during saga execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Saga execution started; records the accepted request.
    SagaStarted(SagaStartedData),

    /// Step 1 completed: the invoice record was created downstream.
    InvoiceCreated(StepResultData),

    /// Step 2 completed: the PDF was generated and stored (terminal).
    PdfStored(StepResultData),

    /// A step was rejected or exhausted its retries (terminal).
    SagaFailed(SagaFailedData),
}

impl SagaEvent {
    /// Returns the journal event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::InvoiceCreated(_) => "InvoiceCreated",
            SagaEvent::PdfStored(_) => "PdfStored",
            SagaEvent::SagaFailed(_) => "SagaFailed",
        }
    }
}

/// Data for SagaStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The saga instance ID.
    pub saga_id: SagaId,
    /// The tenant the invoice belongs to.
    pub tenant_id: TenantId,
    /// The acting user.
    pub user_id: UserId,
    /// The accepted request payload.
    pub payload: String,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data for step completion events; carries the remote call's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResultData {
    /// The step's result, as returned by the accounting service.
    pub result: String,
    /// When the step completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for SagaFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFailedData {
    /// The step that failed.
    pub step: String,
    /// Error message describing the failure.
    pub reason: String,
    /// When the saga failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    /// Creates a SagaStarted event from an accepted request.
    pub fn saga_started(saga_id: SagaId, request: &InvoiceRequest) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id,
            tenant_id: request.tenant_id.clone(),
            user_id: request.user_id.clone(),
            payload: request.payload.clone(),
            started_at: Utc::now(),
        })
    }

    /// Creates an InvoiceCreated event.
    pub fn invoice_created(result: impl Into<String>) -> Self {
        SagaEvent::InvoiceCreated(StepResultData {
            result: result.into(),
            completed_at: Utc::now(),
        })
    }

    /// Creates a PdfStored event.
    pub fn pdf_stored(result: impl Into<String>) -> Self {
        SagaEvent::PdfStored(StepResultData {
            result: result.into(),
            completed_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event.
    pub fn saga_failed(step: impl Into<String>, reason: impl Into<String>) -> Self {
        SagaEvent::SagaFailed(SagaFailedData {
            step: step.into(),
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice_creation;

    fn make_request() -> InvoiceRequest {
        InvoiceRequest::new("tenant-1", "u-42", "{\"amount\": 100}")
    }

    fn make_saga_id() -> SagaId {
        SagaId::derive(&TenantId::from("tenant-1"), "req-1")
    }

    #[test]
    fn test_event_type() {
        let saga_id = make_saga_id();
        let request = make_request();

        assert_eq!(
            SagaEvent::saga_started(saga_id, &request).event_type(),
            "SagaStarted"
        );
        assert_eq!(
            SagaEvent::invoice_created("INV-0001").event_type(),
            "InvoiceCreated"
        );
        assert_eq!(SagaEvent::pdf_stored("PDF-0001").event_type(), "PdfStored");
        assert_eq!(
            SagaEvent::saga_failed(invoice_creation::STEP_GENERATE_PDF, "rejected").event_type(),
            "SagaFailed"
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let saga_id = make_saga_id();
        let request = make_request();

        let events = vec![
            SagaEvent::saga_started(saga_id, &request),
            SagaEvent::invoice_created("INV-0001"),
            SagaEvent::pdf_stored("PDF-0001"),
            SagaEvent::saga_failed(invoice_creation::STEP_CREATE_INVOICE, "unavailable"),
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event.event_type(), deserialized.event_type());
        }
    }

    #[test]
    fn test_saga_started_data() {
        let saga_id = make_saga_id();
        let request = make_request();
        let event = SagaEvent::saga_started(saga_id, &request);

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::SagaStarted(data) = deserialized {
            assert_eq!(data.saga_id, saga_id);
            assert_eq!(data.tenant_id, request.tenant_id);
            assert_eq!(data.user_id, request.user_id);
            assert_eq!(data.payload, request.payload);
        } else {
            panic!("Expected SagaStarted event");
        }
    }

    #[test]
    fn test_step_result_data() {
        let event = SagaEvent::invoice_created("INV-0042");

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::InvoiceCreated(data) = deserialized {
            assert_eq!(data.result, "INV-0042");
        } else {
            panic!("Expected InvoiceCreated event");
        }
    }
}
