//! Client for the downstream accounting service.
//!
//! Two operations, called in sequence by the saga: create the invoice
//! record, then generate and store its PDF. Both carry the tenant and
//! user identity as transport-level headers and exchange opaque string
//! bodies. The client holds no state of its own; safety of re-sending a
//! request rests on the accounting service's own idempotency contract.

pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use common::{TenantId, UserId};

pub use error::ClientError;
pub use http::{CREATE_INVOICE_PATH, CREATE_PDF_PATH, HttpAccountingClient, TENANT_HEADER, USER_HEADER};
pub use memory::InMemoryAccountingClient;

/// Trait for accounting service operations.
#[async_trait]
pub trait AccountingClient: Send + Sync {
    /// Creates the invoice record (and performs e-invoicing) downstream.
    ///
    /// Returns the service's response body, which the PDF step consumes
    /// as its input.
    async fn create_invoice(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        payload: &str,
    ) -> Result<String, ClientError>;

    /// Generates the invoice PDF, stores it, and updates invoice details
    /// downstream. Takes the create-invoice response as its request body.
    ///
    /// Returns the PDF reference (presigned URL) from the service.
    async fn generate_pdf(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        invoice: &str,
    ) -> Result<String, ClientError>;
}
