//! Comment database repository
//!
//! A comment is the per-user viewed marker on a media file. One row per
//! (user, file) pair.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_file_id: Uuid,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting a viewed marker
#[derive(Debug)]
pub struct UpsertComment {
    pub user_id: Uuid,
    pub media_file_id: Uuid,
    pub viewed: bool,
}

pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Set or update a viewed marker
    pub async fn upsert(&self, input: UpsertComment) -> Result<CommentRecord> {
        let record = sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comments (user_id, media_file_id, viewed)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, media_file_id) DO UPDATE SET
                viewed = EXCLUDED.viewed,
                updated_at = NOW()
            RETURNING id, user_id, media_file_id, viewed, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.media_file_id)
        .bind(input.viewed)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Fetch viewed markers for many files at once
    pub async fn get_batch(
        &self,
        user_id: Uuid,
        media_file_ids: &[Uuid],
    ) -> Result<Vec<CommentRecord>> {
        if media_file_ids.is_empty() {
            return Ok(vec![]);
        }

        let records = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT id, user_id, media_file_id, viewed, created_at, updated_at
            FROM comments
            WHERE user_id = $1 AND media_file_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(media_file_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

}
