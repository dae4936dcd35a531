use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    JournalError, JournalRecord, RecordId, Result, SagaId, Version,
    store::{AppendOptions, JournalStore, validate_records_for_append},
};

/// PostgreSQL-backed journal implementation.
#[derive(Clone)]
pub struct PostgresJournal {
    pool: PgPool,
}

impl PostgresJournal {
    /// Creates a new PostgreSQL journal.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<JournalRecord> {
        Ok(JournalRecord {
            record_id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            saga_id: SagaId::from_uuid(row.try_get::<Uuid, _>("saga_id")?),
            saga_type: row.try_get("saga_type")?,
            version: Version::new(row.try_get("version")?),
            timestamp: row.try_get("timestamp")?,
            payload: row.try_get("payload")?,
        })
    }
}

#[async_trait]
impl JournalStore for PostgresJournal {
    async fn append(
        &self,
        records: Vec<JournalRecord>,
        options: AppendOptions,
    ) -> Result<Version> {
        validate_records_for_append(&records)?;

        let first = &records[0];
        let saga_id = first.saga_id;

        let mut tx = self.pool.begin().await?;

        // Check expected version if specified
        if let Some(expected) = options.expected_version {
            let current_version: Option<i64> =
                sqlx::query_scalar("SELECT MAX(version) FROM saga_journal WHERE saga_id = $1")
                    .bind(saga_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;

            let actual = Version::new(current_version.unwrap_or(0));

            if actual != expected {
                return Err(JournalError::ConcurrencyConflict {
                    saga_id,
                    expected,
                    actual,
                });
            }
        }

        // Insert all records
        let mut last_version = Version::initial();
        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO saga_journal (id, event_type, saga_id, saga_type, version, timestamp, payload)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.record_id.as_uuid())
            .bind(&record.event_type)
            .bind(record.saga_id.as_uuid())
            .bind(&record.saga_type)
            .bind(record.version.as_i64())
            .bind(record.timestamp)
            .bind(&record.payload)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A unique constraint violation means another writer won the race
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("unique_saga_version")
                {
                    return JournalError::ConcurrencyConflict {
                        saga_id,
                        expected: options.expected_version.unwrap_or(Version::initial()),
                        actual: record.version,
                    };
                }
                JournalError::Database(e)
            })?;

            last_version = record.version;
        }

        tx.commit().await?;
        Ok(last_version)
    }

    async fn get_records(&self, saga_id: SagaId) -> Result<Vec<JournalRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, saga_id, saga_type, version, timestamp, payload
            FROM saga_journal
            WHERE saga_id = $1
            ORDER BY version ASC
            "#,
        )
        .bind(saga_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn get_version(&self, saga_id: SagaId) -> Result<Option<Version>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM saga_journal WHERE saga_id = $1")
                .bind(saga_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(version.map(Version::new))
    }
}
