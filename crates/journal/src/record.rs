use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SagaId;

/// Unique identifier for a journal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version number for a saga's journal, used for optimistic concurrency
/// control.
///
/// Versions start at 1 for the first record and increment by 1 for each
/// subsequent record on a saga.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a saga with no records.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first record.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A journal record: one saga event along with the bookkeeping needed for
/// storage and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Unique identifier for this record.
    pub record_id: RecordId,

    /// The type of the recorded event (e.g., "SagaStarted", "PdfStored").
    pub event_type: String,

    /// The saga this record belongs to.
    pub saga_id: SagaId,

    /// The type of saga (e.g., "InvoiceCreation").
    pub saga_type: String,

    /// The version of the saga's journal after this record.
    pub version: Version,

    /// When the record was created.
    pub timestamp: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

impl JournalRecord {
    /// Creates a new journal record builder.
    pub fn builder() -> JournalRecordBuilder {
        JournalRecordBuilder::default()
    }
}

/// Builder for constructing journal records.
#[derive(Debug, Default)]
pub struct JournalRecordBuilder {
    record_id: Option<RecordId>,
    event_type: Option<String>,
    saga_id: Option<SagaId>,
    saga_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl JournalRecordBuilder {
    /// Sets the record ID. If not set, a new ID will be generated.
    pub fn record_id(mut self, id: RecordId) -> Self {
        self.record_id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the saga ID.
    pub fn saga_id(mut self, id: SagaId) -> Self {
        self.saga_id = Some(id);
        self
    }

    /// Sets the saga type.
    pub fn saga_type(mut self, saga_type: impl Into<String>) -> Self {
        self.saga_type = Some(saga_type.into());
        self
    }

    /// Sets the version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: serde::Serialize>(
        mut self,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the journal record.
    ///
    /// # Panics
    ///
    /// Panics if required fields (event_type, saga_id, saga_type, version,
    /// payload) are not set.
    pub fn build(self) -> JournalRecord {
        JournalRecord {
            record_id: self.record_id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            saga_id: self.saga_id.expect("saga_id is required"),
            saga_type: self.saga_type.expect("saga_type is required"),
            version: self.version.expect("version is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
        }
    }
}
