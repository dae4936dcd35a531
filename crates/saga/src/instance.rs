//! Saga instance reconstructed from journal records.

use common::{SagaId, TenantId, UserId};
use serde::{Deserialize, Serialize};

use crate::events::SagaEvent;
use crate::state::SagaState;

/// A saga instance: the current state of one invoice creation execution,
/// derived by folding its journal events.
///
/// Holds the accepted request data and the results of completed steps, so
/// a resumed execution skips steps whose results are already recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SagaInstance {
    id: Option<SagaId>,
    tenant_id: Option<TenantId>,
    user_id: Option<UserId>,
    payload: Option<String>,
    state: SagaState,
    /// Result of the create-invoice step, once recorded.
    invoice_result: Option<String>,
    /// Result of the PDF step, once recorded.
    pdf_result: Option<String>,
    /// The step that failed, if any.
    failed_step: Option<String>,
    /// Reason for failure, if any.
    failure_reason: Option<String>,
}

impl SagaInstance {
    /// Applies a journal event, advancing the instance's state.
    pub fn apply(&mut self, event: SagaEvent) {
        match event {
            SagaEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.tenant_id = Some(data.tenant_id);
                self.user_id = Some(data.user_id);
                self.payload = Some(data.payload);
                self.state = SagaState::Started;
            }
            SagaEvent::InvoiceCreated(data) => {
                self.invoice_result = Some(data.result);
                self.state = SagaState::InvoiceCreated;
            }
            SagaEvent::PdfStored(data) => {
                self.pdf_result = Some(data.result);
                self.state = SagaState::PdfStored;
            }
            SagaEvent::SagaFailed(data) => {
                self.failed_step = Some(data.step);
                self.failure_reason = Some(data.reason);
                self.state = SagaState::Failed;
            }
        }
    }

    /// Returns the saga ID, once started.
    pub fn id(&self) -> Option<SagaId> {
        self.id
    }

    /// Returns the saga state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the tenant, once started.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    /// Returns the acting user, once started.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Returns the accepted request payload, once started.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Returns the create-invoice step's result, if recorded.
    pub fn invoice_result(&self) -> Option<&str> {
        self.invoice_result.as_deref()
    }

    /// Returns the PDF step's result, if recorded.
    pub fn pdf_result(&self) -> Option<&str> {
        self.pdf_result.as_deref()
    }

    /// Returns the failed step, if any.
    pub fn failed_step(&self) -> Option<&str> {
        self.failed_step.as_deref()
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
