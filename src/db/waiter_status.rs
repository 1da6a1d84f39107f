//! Waiter status snapshot database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Waiter status record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaiterStatusRecord {
    pub id: Uuid,
    pub failed_status: bool,
    pub status_date: DateTime<Utc>,
}

pub struct WaiterStatusRepository {
    pool: PgPool,
}

impl WaiterStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a health check outcome
    pub async fn record(&self, failed_status: bool) -> Result<WaiterStatusRecord> {
        let record = sqlx::query_as::<_, WaiterStatusRecord>(
            r#"
            INSERT INTO waiter_status (failed_status)
            VALUES ($1)
            RETURNING id, failed_status, status_date
            "#,
        )
        .bind(failed_status)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Most recent snapshot
    pub async fn latest(&self) -> Result<Option<WaiterStatusRecord>> {
        let record = sqlx::query_as::<_, WaiterStatusRecord>(
            r#"
            SELECT id, failed_status, status_date
            FROM waiter_status
            ORDER BY status_date DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Trim snapshots older than the retention window, always keeping the
    /// newest row; returns number deleted
    pub async fn expire_older_than_days(&self, days: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM waiter_status
            WHERE status_date < NOW() - ($1 * INTERVAL '1 day')
              AND id <> (SELECT id FROM waiter_status ORDER BY status_date DESC LIMIT 1)
            "#,
        )
        .bind(days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
