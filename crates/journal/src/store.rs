use async_trait::async_trait;

use crate::{JournalError, JournalRecord, Result, SagaId, Version};

/// Options for appending records to the journal.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the saga's journal for optimistic concurrency
    /// control. If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the journal to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the saga to have no records yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for saga journal implementations.
///
/// The journal is an append-only log of saga events keyed by `SagaId`.
/// Replaying a saga's records reconstructs its state, which is how an
/// interrupted execution resumes from the last completed step. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Appends records to the journal.
    ///
    /// Records are appended atomically - either all succeed or none do.
    /// If `options.expected_version` is set, the operation fails with
    /// `ConcurrencyConflict` when the current version doesn't match.
    ///
    /// Returns the new version of the saga's journal after appending.
    async fn append(&self, records: Vec<JournalRecord>, options: AppendOptions)
    -> Result<Version>;

    /// Retrieves all records for a saga, in version order (oldest first).
    async fn get_records(&self, saga_id: SagaId) -> Result<Vec<JournalRecord>>;

    /// Gets the current journal version of a saga.
    ///
    /// Returns None if the saga has no records.
    async fn get_version(&self, saga_id: SagaId) -> Result<Option<Version>>;
}

/// Validates records before appending.
pub fn validate_records_for_append(records: &[JournalRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(JournalError::InvalidAppend(
            "Cannot append empty record list".to_string(),
        ));
    }

    // All records must be for the same saga
    let first = &records[0];
    for record in records.iter().skip(1) {
        if record.saga_id != first.saga_id {
            return Err(JournalError::InvalidAppend(
                "All records must be for the same saga".to_string(),
            ));
        }
        if record.saga_type != first.saga_type {
            return Err(JournalError::InvalidAppend(
                "All records must have the same saga type".to_string(),
            ));
        }
    }

    // Versions must be sequential
    let mut expected_version = first.version;
    for record in records.iter().skip(1) {
        expected_version = expected_version.next();
        if record.version != expected_version {
            return Err(JournalError::InvalidAppend(format!(
                "Record versions must be sequential. Expected {}, got {}",
                expected_version, record.version
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TenantId;

    fn make_record(saga_id: SagaId, version: i64) -> JournalRecord {
        JournalRecord::builder()
            .saga_id(saga_id)
            .saga_type("InvoiceCreation")
            .event_type("SagaStarted")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({}))
            .build()
    }

    #[test]
    fn rejects_empty_batch() {
        let result = validate_records_for_append(&[]);
        assert!(matches!(result, Err(JournalError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_mixed_sagas() {
        let id1 = SagaId::derive(&TenantId::from("t1"), "a");
        let id2 = SagaId::derive(&TenantId::from("t1"), "b");
        let records = vec![make_record(id1, 1), make_record(id2, 2)];
        assert!(validate_records_for_append(&records).is_err());
    }

    #[test]
    fn rejects_version_gaps() {
        let id = SagaId::derive(&TenantId::from("t1"), "a");
        let records = vec![make_record(id, 1), make_record(id, 3)];
        assert!(validate_records_for_append(&records).is_err());
    }

    #[test]
    fn accepts_sequential_versions() {
        let id = SagaId::derive(&TenantId::from("t1"), "a");
        let records = vec![make_record(id, 1), make_record(id, 2), make_record(id, 3)];
        assert!(validate_records_for_append(&records).is_ok());
    }
}
