pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::SagaId;
pub use error::{JournalError, Result};
pub use memory::InMemoryJournal;
pub use postgres::PostgresJournal;
pub use record::{JournalRecord, JournalRecordBuilder, RecordId, Version};
pub use store::{AppendOptions, JournalStore};
