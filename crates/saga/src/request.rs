//! The inbound invoice creation request.

use common::{TenantId, UserId};
use serde::{Deserialize, Serialize};

/// An accepted invoice creation request.
///
/// Immutable once accepted: the payload is carried opaquely to the
/// accounting service and journaled with the saga so a resumed execution
/// works from the originally accepted data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// The tenant the invoice belongs to.
    pub tenant_id: TenantId,
    /// The user acting on the tenant's behalf.
    pub user_id: UserId,
    /// Opaque request payload, forwarded as the create-invoice body.
    pub payload: String,
}

impl InvoiceRequest {
    /// Creates a new invoice request.
    pub fn new(
        tenant_id: impl Into<TenantId>,
        user_id: impl Into<UserId>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            payload: payload.into(),
        }
    }
}
