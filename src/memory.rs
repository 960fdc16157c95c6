//! Append-only SQLite memory log.
//!
//! One row per successful pipeline run. The store is opened only when the
//! persistence branch actually executes, used for exactly one append, and
//! closed on every exit path. Nothing here ever updates or deletes rows.

use crate::error::PersistenceError;
use crate::schema::now_utc;
use sqlx::SqlitePool;
use std::path::Path;

#[derive(Debug)]
pub struct MemoryStore {
    pool: SqlitePool,
}

impl MemoryStore {
    /// Open (or create) the database at `db_path`, creating parent
    /// directories as needed. Schema creation is idempotent: safe on
    /// every run.
    pub async fn open(db_path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::Open(e.to_string()))?;
        }

        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| PersistenceError::Open(e.to_string()))?;

        init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (useful for tests).
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| PersistenceError::Open(e.to_string()))?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Append exactly one record with a fresh UTC timestamp. The write
    /// commits before this returns; there is no batching.
    pub async fn record(
        &self,
        input_text: &str,
        summary: &str,
        confidence: f64,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO memory (timestamp, input_text, summary, confidence)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(now_utc())
        .bind(input_text)
        .bind(summary)
        .bind(confidence)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Append(e.to_string()))?;

        tracing::debug!("memory record appended");
        Ok(())
    }

    /// Number of rows in the log.
    pub async fn count(&self) -> Result<i64, PersistenceError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM memory")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PersistenceError::Append(e.to_string()))
    }

    /// Most recent record, as `(timestamp, input_text, summary, confidence)`.
    pub async fn latest(&self) -> Result<Option<(String, String, String, f64)>, PersistenceError> {
        sqlx::query_as(
            "SELECT timestamp, input_text, summary, confidence
             FROM memory ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PersistenceError::Append(e.to_string()))
    }

    /// Release the pool. Dropping would eventually do this; closing
    /// explicitly keeps the single-append lifecycle visible.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS memory (
            id         INTEGER PRIMARY KEY,
            timestamp  TEXT,
            input_text TEXT,
            summary    TEXT,
            confidence REAL
        );",
    )
    .execute(pool)
    .await
    .map_err(|e| PersistenceError::Open(e.to_string()))?;
    Ok(())
}
