use std::time::Duration;

use async_trait::async_trait;
use common::{TenantId, UserId};

use crate::{AccountingClient, error::ClientError};

/// Header carrying the tenant identity on every accounting call.
pub const TENANT_HEADER: &str = "x-acc-tenant-id";

/// Header carrying the acting user on every accounting call.
pub const USER_HEADER: &str = "x-acc-user-id";

/// Path of the invoice-creation endpoint.
pub const CREATE_INVOICE_PATH: &str = "/invoice/create";

/// Path of the PDF generation/storage endpoint.
pub const CREATE_PDF_PATH: &str = "/invoice/create-pdf";

/// Reqwest-backed accounting client.
///
/// Endpoint URLs are resolved once at construction from the configured
/// base URL. Transport failures map to `Unavailable`, non-success
/// responses to `Rejected`.
#[derive(Debug, Clone)]
pub struct HttpAccountingClient {
    client: reqwest::Client,
    create_invoice_url: String,
    create_pdf_url: String,
}

impl HttpAccountingClient {
    /// Creates a client against the given base URL with a per-request
    /// timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            create_invoice_url: format!("{base}{CREATE_INVOICE_PATH}"),
            create_pdf_url: format!("{base}{CREATE_PDF_PATH}"),
        })
    }

    async fn post(
        &self,
        url: &str,
        tenant_id: &TenantId,
        user_id: &UserId,
        body: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(url)
            .header(TENANT_HEADER, tenant_id.as_str())
            .header(USER_HEADER, user_id.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl AccountingClient for HttpAccountingClient {
    async fn create_invoice(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        payload: &str,
    ) -> Result<String, ClientError> {
        self.post(&self.create_invoice_url, tenant_id, user_id, payload)
            .await
    }

    async fn generate_pdf(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        invoice: &str,
    ) -> Result<String, ClientError> {
        self.post(&self.create_pdf_url, tenant_id, user_id, invoice)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_resolved_from_base() {
        let client =
            HttpAccountingClient::new("http://localhost:8090", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.create_invoice_url,
            "http://localhost:8090/invoice/create"
        );
        assert_eq!(
            client.create_pdf_url,
            "http://localhost:8090/invoice/create-pdf"
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client =
            HttpAccountingClient::new("http://accounting-system/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.create_invoice_url,
            "http://accounting-system/invoice/create"
        );
    }

    #[tokio::test]
    async fn unreachable_service_maps_to_unavailable() {
        // Nothing listens on this port
        let client =
            HttpAccountingClient::new("http://127.0.0.1:59999", Duration::from_millis(200))
                .unwrap();
        let result = client
            .create_invoice(
                &TenantId::from("tenant-1"),
                &UserId::from("u-1"),
                "{\"amount\": 100}",
            )
            .await;
        assert!(matches!(result, Err(ClientError::Unavailable(_))));
    }
}
