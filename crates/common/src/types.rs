use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic saga ID derivation (UUID v5).
const SAGA_ID_NAMESPACE: Uuid = Uuid::from_u128(0x9f2c_4d81_7a6e_4b39_a1d5_0c8e_3f72_b614);

/// Identifier for the tenant a request belongs to.
///
/// Carried end-to-end: extracted from the `x-acc-tenant-id` header on the
/// inbound request and forwarded on every outbound accounting call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID from a raw string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier for the acting user, forwarded as `x-acc-user-id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user ID from a raw string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a saga execution.
///
/// Derived deterministically from the tenant and a request key, so a
/// re-delivered start request maps to the same logical execution instead
/// of spawning a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SagaId(Uuid);

impl SagaId {
    /// Derives a saga ID from the tenant and a request key.
    ///
    /// The key is either a caller-supplied idempotency key or the raw
    /// request payload. Same inputs always produce the same ID.
    pub fn derive(tenant_id: &TenantId, request_key: &str) -> Self {
        let name = format!("{}:{}", tenant_id.as_str(), request_key);
        Self(Uuid::new_v5(&SAGA_ID_NAMESPACE, name.as_bytes()))
    }

    /// Creates a saga ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SagaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SagaId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<SagaId> for Uuid {
    fn from(id: SagaId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saga_id_derivation_is_deterministic() {
        let tenant = TenantId::from("tenant-1");
        let id1 = SagaId::derive(&tenant, "key-1");
        let id2 = SagaId::derive(&tenant, "key-1");
        assert_eq!(id1, id2);
    }

    #[test]
    fn saga_id_differs_per_tenant() {
        let id1 = SagaId::derive(&TenantId::from("tenant-1"), "key-1");
        let id2 = SagaId::derive(&TenantId::from("tenant-2"), "key-1");
        assert_ne!(id1, id2);
    }

    #[test]
    fn saga_id_differs_per_request_key() {
        let tenant = TenantId::from("tenant-1");
        let id1 = SagaId::derive(&tenant, "key-1");
        let id2 = SagaId::derive(&tenant, "key-2");
        assert_ne!(id1, id2);
    }

    #[test]
    fn saga_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = SagaId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn saga_id_serialization_roundtrip() {
        let id = SagaId::derive(&TenantId::from("tenant-1"), "key-1");
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: SagaId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn tenant_id_display_matches_value() {
        let tenant = TenantId::new("acme");
        assert_eq!(tenant.to_string(), "acme");
        assert_eq!(tenant.as_str(), "acme");
    }

    #[test]
    fn user_id_serialization_is_transparent() {
        let user = UserId::new("u-42");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, "\"u-42\"");
    }
}
