//! In-app message database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Message record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub level: String,
    pub sent: bool,
    pub touched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a message
#[derive(Debug)]
pub struct CreateMessage {
    pub user_id: Uuid,
    pub body: String,
    pub level: String,
}

pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a message by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, user_id, body, level, sent, touched_at, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List a user's unacknowledged messages, oldest first
    pub async fn list_pending(&self, user_id: Uuid) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, user_id, body, level, sent, touched_at, created_at
            FROM messages
            WHERE user_id = $1 AND sent = false
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a message for a user
    pub async fn create(&self, input: CreateMessage) -> Result<MessageRecord> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (user_id, body, level)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, body, level, sent, touched_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.body)
        .bind(&input.level)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Acknowledge a message
    pub async fn mark_sent(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            UPDATE messages SET
                sent = true,
                touched_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, body, level, sent, touched_at, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

}
