use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{TenantId, UserId};

use crate::{AccountingClient, error::ClientError};

#[derive(Debug, Default)]
struct InMemoryState {
    invoices: Vec<(TenantId, UserId, String)>,
    pdfs: Vec<(TenantId, UserId, String)>,
    next_invoice: u32,
    next_pdf: u32,
    create_attempts: u32,
    pdf_attempts: u32,
    reject_create: bool,
    reject_pdf: bool,
    unavailable_creates: u32,
    unavailable_pdfs: u32,
    latency: Option<Duration>,
}

/// In-memory accounting client for testing.
///
/// Records every call and hands out sequenced results (`INV-0001`,
/// `PDF-0001`). Failure injection: a step can reject permanently or be
/// unavailable for its first N attempts; per-call latency supports
/// concurrency and cancellation tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountingClient {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryAccountingClient {
    /// Creates a new in-memory accounting client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the create-invoice step to reject (non-retryable).
    pub fn set_reject_on_create(&self, reject: bool) {
        self.state.write().unwrap().reject_create = reject;
    }

    /// Configures the PDF step to reject (non-retryable).
    pub fn set_reject_on_pdf(&self, reject: bool) {
        self.state.write().unwrap().reject_pdf = reject;
    }

    /// Makes the next `times` create-invoice calls fail as unavailable.
    pub fn set_unavailable_on_create(&self, times: u32) {
        self.state.write().unwrap().unavailable_creates = times;
    }

    /// Makes the next `times` PDF calls fail as unavailable.
    pub fn set_unavailable_on_pdf(&self, times: u32) {
        self.state.write().unwrap().unavailable_pdfs = times;
    }

    /// Adds artificial latency to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Returns the number of invoices created.
    pub fn invoice_count(&self) -> usize {
        self.state.read().unwrap().invoices.len()
    }

    /// Returns the number of PDFs generated.
    pub fn pdf_count(&self) -> usize {
        self.state.read().unwrap().pdfs.len()
    }

    /// Returns the total number of create-invoice attempts, including
    /// failed ones.
    pub fn create_attempts(&self) -> u32 {
        self.state.read().unwrap().create_attempts
    }

    /// Returns the total number of PDF attempts, including failed ones.
    pub fn pdf_attempts(&self) -> u32 {
        self.state.read().unwrap().pdf_attempts
    }

    /// Returns the body the last PDF call was invoked with.
    pub fn last_pdf_input(&self) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .pdfs
            .last()
            .map(|(_, _, input)| input.clone())
    }

    async fn simulate_latency(&self) {
        let latency = self.state.read().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl AccountingClient for InMemoryAccountingClient {
    async fn create_invoice(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        payload: &str,
    ) -> Result<String, ClientError> {
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        state.create_attempts += 1;

        if state.unavailable_creates > 0 {
            state.unavailable_creates -= 1;
            return Err(ClientError::Unavailable("connection refused".to_string()));
        }

        if state.reject_create {
            return Err(ClientError::Rejected {
                status: 422,
                body: "invoice rejected".to_string(),
            });
        }

        state.next_invoice += 1;
        let result = format!("INV-{:04}", state.next_invoice);
        state
            .invoices
            .push((tenant_id.clone(), user_id.clone(), payload.to_string()));

        Ok(result)
    }

    async fn generate_pdf(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        invoice: &str,
    ) -> Result<String, ClientError> {
        self.simulate_latency().await;

        let mut state = self.state.write().unwrap();
        state.pdf_attempts += 1;

        if state.unavailable_pdfs > 0 {
            state.unavailable_pdfs -= 1;
            return Err(ClientError::Unavailable("connection refused".to_string()));
        }

        if state.reject_pdf {
            return Err(ClientError::Rejected {
                status: 422,
                body: "pdf generation rejected".to_string(),
            });
        }

        state.next_pdf += 1;
        let result = format!("PDF-{:04}", state.next_pdf);
        state
            .pdfs
            .push((tenant_id.clone(), user_id.clone(), invoice.to_string()));

        Ok(result)
    }
}
