use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    JournalError, JournalRecord, Result, SagaId, Version,
    store::{AppendOptions, JournalStore, validate_records_for_append},
};

/// In-memory journal implementation for tests and local runs.
///
/// Stores all records in memory and provides the same interface and
/// concurrency semantics as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryJournal {
    records: Arc<RwLock<Vec<JournalRecord>>>,
}

impl InMemoryJournal {
    /// Creates a new empty in-memory journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl JournalStore for InMemoryJournal {
    async fn append(
        &self,
        records: Vec<JournalRecord>,
        options: AppendOptions,
    ) -> Result<Version> {
        validate_records_for_append(&records)?;

        let first = &records[0];
        let saga_id = first.saga_id;

        let mut store = self.records.write().await;

        // Get current version for this saga
        let current_version = store
            .iter()
            .filter(|r| r.saga_id == saga_id)
            .map(|r| r.version)
            .max()
            .unwrap_or(Version::initial());

        // Check expected version if specified
        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(JournalError::ConcurrencyConflict {
                saga_id,
                expected,
                actual: current_version,
            });
        }

        // Check for version conflicts (unique constraint simulation)
        let first_new_version = first.version;
        if first_new_version <= current_version && current_version != Version::initial() {
            return Err(JournalError::ConcurrencyConflict {
                saga_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let last_version = records
            .last()
            .map(|r| r.version)
            .unwrap_or(Version::initial());
        store.extend(records);

        Ok(last_version)
    }

    async fn get_records(&self, saga_id: SagaId) -> Result<Vec<JournalRecord>> {
        let store = self.records.read().await;
        let mut records: Vec<_> = store
            .iter()
            .filter(|r| r.saga_id == saga_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.version);
        Ok(records)
    }

    async fn get_version(&self, saga_id: SagaId) -> Result<Option<Version>> {
        let store = self.records.read().await;
        let version = store
            .iter()
            .filter(|r| r.saga_id == saga_id)
            .map(|r| r.version)
            .max();
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TenantId;

    fn create_test_record(saga_id: SagaId, version: Version, event_type: &str) -> JournalRecord {
        JournalRecord::builder()
            .saga_id(saga_id)
            .saga_type("InvoiceCreation")
            .event_type(event_type)
            .version(version)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
    }

    fn make_saga_id(key: &str) -> SagaId {
        SagaId::derive(&TenantId::from("tenant-1"), key)
    }

    #[tokio::test]
    async fn append_single_record() {
        let journal = InMemoryJournal::new();
        let saga_id = make_saga_id("a");
        let record = create_test_record(saga_id, Version::first(), "SagaStarted");

        let result = journal
            .append(vec![record], AppendOptions::expect_new())
            .await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Version::first());

        let records = journal.get_records(saga_id).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn append_multiple_records() {
        let journal = InMemoryJournal::new();
        let saga_id = make_saga_id("b");

        let records = vec![
            create_test_record(saga_id, Version::new(1), "SagaStarted"),
            create_test_record(saga_id, Version::new(2), "InvoiceCreated"),
            create_test_record(saga_id, Version::new(3), "PdfStored"),
        ];

        let result = journal.append(records, AppendOptions::expect_new()).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Version::new(3));

        let stored = journal.get_records(saga_id).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].event_type, "SagaStarted");
        assert_eq!(stored[2].event_type, "PdfStored");
    }

    #[tokio::test]
    async fn concurrency_conflict_on_wrong_version() {
        let journal = InMemoryJournal::new();
        let saga_id = make_saga_id("c");

        let record1 = create_test_record(saga_id, Version::first(), "SagaStarted");
        journal
            .append(vec![record1], AppendOptions::expect_new())
            .await
            .unwrap();

        // Try to append with wrong expected version
        let record2 = create_test_record(saga_id, Version::new(2), "InvoiceCreated");
        let result = journal
            .append(
                vec![record2],
                AppendOptions::expect_version(Version::initial()),
            )
            .await;

        assert!(matches!(
            result,
            Err(JournalError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn append_with_correct_expected_version() {
        let journal = InMemoryJournal::new();
        let saga_id = make_saga_id("d");

        let record1 = create_test_record(saga_id, Version::first(), "SagaStarted");
        journal
            .append(vec![record1], AppendOptions::expect_new())
            .await
            .unwrap();

        let record2 = create_test_record(saga_id, Version::new(2), "InvoiceCreated");
        let result = journal
            .append(
                vec![record2],
                AppendOptions::expect_version(Version::first()),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn records_are_isolated_per_saga() {
        let journal = InMemoryJournal::new();
        let id1 = make_saga_id("e");
        let id2 = make_saga_id("f");

        journal
            .append(
                vec![create_test_record(id1, Version::first(), "SagaStarted")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        journal
            .append(
                vec![create_test_record(id2, Version::first(), "SagaStarted")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        assert_eq!(journal.get_records(id1).await.unwrap().len(), 1);
        assert_eq!(journal.get_records(id2).await.unwrap().len(), 1);
        assert_eq!(journal.record_count().await, 2);
    }

    #[tokio::test]
    async fn get_version_tracks_latest() {
        let journal = InMemoryJournal::new();
        let saga_id = make_saga_id("g");

        // No records yet
        let version = journal.get_version(saga_id).await.unwrap();
        assert!(version.is_none());

        let records = vec![
            create_test_record(saga_id, Version::new(1), "SagaStarted"),
            create_test_record(saga_id, Version::new(2), "InvoiceCreated"),
        ];
        journal.append(records, AppendOptions::new()).await.unwrap();

        let version = journal.get_version(saga_id).await.unwrap();
        assert_eq!(version, Some(Version::new(2)));
    }

    #[tokio::test]
    async fn get_records_for_unknown_saga_is_empty() {
        let journal = InMemoryJournal::new();
        let records = journal.get_records(make_saga_id("nope")).await.unwrap();
        assert!(records.is_empty());
    }
}
