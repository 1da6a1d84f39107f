//! Video progress database repository
//!
//! Resume offsets keyed by (user, hashed filename). The hashed filename is
//! the client-facing key; the optional media file link lets the server tie
//! progress back to catalog rows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Video progress record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub hashed_filename: String,
    pub offset_secs: f64,
    pub date_edited: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for upserting video progress
#[derive(Debug)]
pub struct UpsertVideoProgress {
    pub user_id: Uuid,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub hashed_filename: String,
    pub offset_secs: f64,
}

pub struct VideoProgressRepository {
    pool: PgPool,
}

impl VideoProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get progress for a (user, hashed filename) pair
    pub async fn get(
        &self,
        user_id: Uuid,
        hashed_filename: &str,
    ) -> Result<Option<VideoProgressRecord>> {
        let record = sqlx::query_as::<_, VideoProgressRecord>(
            r#"
            SELECT id, user_id, media_file_id, movie_id, hashed_filename,
                   offset_secs, date_edited, created_at
            FROM video_progress
            WHERE user_id = $1 AND hashed_filename = $2
            "#,
        )
        .bind(user_id)
        .bind(hashed_filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Get progress a user holds for a media file
    pub async fn get_for_file(
        &self,
        user_id: Uuid,
        media_file_id: Uuid,
    ) -> Result<Option<VideoProgressRecord>> {
        let record = sqlx::query_as::<_, VideoProgressRecord>(
            r#"
            SELECT id, user_id, media_file_id, movie_id, hashed_filename,
                   offset_secs, date_edited, created_at
            FROM video_progress
            WHERE user_id = $1 AND media_file_id = $2
            ORDER BY date_edited DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(media_file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Create or update a progress row
    pub async fn upsert(&self, input: UpsertVideoProgress) -> Result<VideoProgressRecord> {
        let record = sqlx::query_as::<_, VideoProgressRecord>(
            r#"
            INSERT INTO video_progress (user_id, media_file_id, movie_id, hashed_filename, offset_secs, date_edited)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id, hashed_filename) DO UPDATE SET
                media_file_id = COALESCE($2, video_progress.media_file_id),
                movie_id = COALESCE($3, video_progress.movie_id),
                offset_secs = $5,
                date_edited = NOW()
            RETURNING id, user_id, media_file_id, movie_id, hashed_filename,
                      offset_secs, date_edited, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.media_file_id)
        .bind(input.movie_id)
        .bind(&input.hashed_filename)
        .bind(input.offset_secs)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete progress for a (user, hashed filename) pair
    pub async fn delete(&self, user_id: Uuid, hashed_filename: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM video_progress WHERE user_id = $1 AND hashed_filename = $2")
                .bind(user_id)
                .bind(hashed_filename)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete rows untouched for longer than the retention window; returns number deleted
    pub async fn expire_older_than_days(&self, days: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM video_progress WHERE date_edited < NOW() - ($1 * INTERVAL '1 day')",
        )
        .bind(days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
