//! Invoice saga trigger and status endpoints.

use std::sync::Arc;

use accounting_client::{AccountingClient, TENANT_HEADER, USER_HEADER};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::{SagaId, TenantId, UserId};
use journal::JournalStore;
use saga::{InvoiceRequest, SagaCoordinator};
use serde::Serialize;

use crate::error::ApiError;

/// Optional caller-supplied idempotency key. When absent the raw request
/// body itself keys the saga, so byte-identical resubmits converge on the
/// same saga ID.
pub const IDEMPOTENCY_KEY_HEADER: &str = "x-acc-idempotency-key";

/// Shared application state accessible from all handlers.
pub struct AppState<J, C>
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    pub coordinator: SagaCoordinator<J, C>,
}

#[derive(Serialize)]
pub struct SagaStatusResponse {
    pub saga_id: String,
    pub state: String,
    pub invoice_result: Option<String>,
    pub pdf_result: Option<String>,
    pub failed_step: Option<String>,
    pub failure_reason: Option<String>,
}

/// POST /create-invoice — run the invoice creation saga to completion.
///
/// Requires the tenant and user identity headers; the body is carried
/// opaquely to the accounting service. Responds with the PDF reference.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn create<J, C>(
    State(state): State<Arc<AppState<J, C>>>,
    headers: HeaderMap,
    payload: String,
) -> Result<String, ApiError>
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    let tenant_id = TenantId::new(required_header(&headers, TENANT_HEADER)?);
    let user_id = UserId::new(required_header(&headers, USER_HEADER)?);

    let request_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| payload.clone());
    let saga_id = SagaId::derive(&tenant_id, &request_key);

    tracing::info!(%saga_id, tenant = %tenant_id, "invoice creation requested");

    let request = InvoiceRequest::new(tenant_id, user_id, payload);
    let pdf = state.coordinator.run(saga_id, request).await?;

    Ok(pdf)
}

/// GET /invoice-sagas/:id — get the journaled state of a saga.
#[tracing::instrument(skip(state))]
pub async fn saga_status<J, C>(
    State(state): State<Arc<AppState<J, C>>>,
    Path(id): Path<String>,
) -> Result<Json<SagaStatusResponse>, ApiError>
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    let saga_id = parse_saga_id(&id)?;

    let saga = state
        .coordinator
        .get_saga(saga_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Saga {id} not found")))?;

    Ok(Json(SagaStatusResponse {
        saga_id: saga_id.to_string(),
        state: saga.state().to_string(),
        invoice_result: saga.invoice_result().map(String::from),
        pdf_result: saga.pdf_result().map(String::from),
        failed_step: saga.failed_step().map(String::from),
        failure_reason: saga.failure_reason().map(String::from),
    }))
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingHeader(name))
}

fn parse_saga_id(id: &str) -> Result<SagaId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(SagaId::from(uuid))
}
