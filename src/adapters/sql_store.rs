//! SQLite-backed record store
//!
//! Mirrors the `generated_data` table layout: a surrogate row id, the
//! endpoint partition key, the per-endpoint `internal_id` and the payload.
//! Id allocation happens inside a single `INSERT ... SELECT MAX(...) + 1`
//! statement, which SQLite executes under its write lock, and the
//! `(endpoint, internal_id)` unique constraint backs it up. The statement
//! inserts nothing once an endpoint's max id is `i64::MAX`.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{GeneratedRecord, RecordStore, StoreError, UpsertOutcome};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS generated_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    endpoint TEXT NOT NULL,
    internal_id INTEGER NOT NULL,
    data TEXT NOT NULL,
    UNIQUE(endpoint, internal_id)
);
"#;

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

pub struct SqlRecordStore {
    pool: SqlitePool,
}

impl SqlRecordStore {
    /// Opens (creating if needed) the database at `url` and ensures the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true);

        let mut pool_options =
            SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS));

        // Each connection to ":memory:" is a separate database, and closing
        // the last one drops it.
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            pool_options = pool_options.max_connections(max_connections);
        }

        tracing::info!("Connecting to SQLite record store at {}", url);
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    fn parse_row(row: &SqliteRow) -> Result<GeneratedRecord, StoreError> {
        Ok(GeneratedRecord {
            endpoint: row.try_get("endpoint")?,
            internal_id: row.try_get("internal_id")?,
            data: row.try_get("data")?,
        })
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn create(&self, endpoint: &str, data: String) -> Result<i64, StoreError> {
        // No row comes back when the current max is already i64::MAX.
        let internal_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO generated_data (endpoint, internal_id, data)
            SELECT ?, current_max + 1, ?
            FROM (
                SELECT COALESCE(MAX(internal_id), 0) AS current_max
                FROM generated_data WHERE endpoint = ?
            )
            WHERE current_max < 9223372036854775807
            RETURNING internal_id
            "#,
        )
        .bind(endpoint)
        .bind(&data)
        .bind(endpoint)
        .fetch_optional(&self.pool)
        .await?;

        internal_id.ok_or_else(|| StoreError::IdSpaceExhausted(endpoint.to_string()))
    }

    async fn find(
        &self,
        endpoint: &str,
        internal_id: i64,
    ) -> Result<Option<GeneratedRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT endpoint, internal_id, data FROM generated_data WHERE endpoint = ? AND internal_id = ?",
        )
        .bind(endpoint)
        .bind(internal_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_row).transpose()
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<GeneratedRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT endpoint, internal_id, data FROM generated_data WHERE endpoint = ? ORDER BY internal_id",
        )
        .bind(endpoint)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_row).collect()
    }

    async fn upsert(
        &self,
        endpoint: &str,
        internal_id: i64,
        data: String,
    ) -> Result<UpsertOutcome, StoreError> {
        // The UPDATE takes the write lock, so the follow-up INSERT cannot race
        // another writer on the same key.
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE generated_data SET data = ? WHERE endpoint = ? AND internal_id = ?",
        )
        .bind(&data)
        .bind(endpoint)
        .bind(internal_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let outcome = if updated == 0 {
            sqlx::query("INSERT INTO generated_data (endpoint, internal_id, data) VALUES (?, ?, ?)")
                .bind(endpoint)
                .bind(internal_id)
                .bind(&data)
                .execute(&mut *tx)
                .await?;
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn delete(&self, endpoint: &str, internal_id: i64) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM generated_data WHERE endpoint = ? AND internal_id = ?")
                .bind(endpoint)
                .bind(internal_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self, endpoint: &str) -> Result<usize, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM generated_data WHERE endpoint = ?")
                .bind(endpoint)
                .fetch_one(&self.pool)
                .await?;

        usize::try_from(count).map_err(|e| StoreError::Internal(e.to_string()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM generated_data")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}
