//! Download token database repository
//!
//! Tokens are GUID-keyed grants the waiter redeems before serving a file.
//! The row id doubles as the redeemable GUID. Validity is a predicate over
//! the issue timestamp, never a stored flag.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Download token record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DownloadTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub display_name: String,
    pub filename: String,
    pub path: String,
    pub is_movie: bool,
    pub issued_at: DateTime<Utc>,
}

impl DownloadTokenRecord {
    /// A token is valid only inside its holding period
    pub fn is_valid(&self, now: DateTime<Utc>, holding_period_secs: i64) -> bool {
        now - self.issued_at < Duration::seconds(holding_period_secs)
    }
}

/// Input for creating a download token
#[derive(Debug)]
pub struct CreateDownloadToken {
    pub user_id: Uuid,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub display_name: String,
    pub filename: String,
    pub path: String,
    pub is_movie: bool,
}

pub struct DownloadTokenRepository {
    pool: PgPool,
}

impl DownloadTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a token by its GUID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<DownloadTokenRecord>> {
        let record = sqlx::query_as::<_, DownloadTokenRecord>(
            r#"
            SELECT id, user_id, media_file_id, movie_id, display_name, filename,
                   path, is_movie, issued_at
            FROM download_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Create a token and evict the user's oldest beyond the cap, atomically
    pub async fn create_with_cap(
        &self,
        input: CreateDownloadToken,
        max_stored: i64,
    ) -> Result<DownloadTokenRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, DownloadTokenRecord>(
            r#"
            INSERT INTO download_tokens (user_id, media_file_id, movie_id, display_name, filename, path, is_movie)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, media_file_id, movie_id, display_name, filename,
                      path, is_movie, issued_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.media_file_id)
        .bind(input.movie_id)
        .bind(&input.display_name)
        .bind(&input.filename)
        .bind(&input.path)
        .bind(input.is_movie)
        .fetch_one(&mut *tx)
        .await?;

        // Keep only the newest `max_stored` tokens for this user.
        sqlx::query(
            r#"
            DELETE FROM download_tokens
            WHERE user_id = $1 AND id NOT IN (
                SELECT id FROM download_tokens
                WHERE user_id = $1
                ORDER BY issued_at DESC
                LIMIT $2
            )
            "#,
        )
        .bind(input.user_id)
        .bind(max_stored)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Delete tokens older than the holding period; returns number deleted
    pub async fn expire_older_than_secs(&self, holding_period_secs: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM download_tokens WHERE issued_at < NOW() - ($1 * INTERVAL '1 second')",
        )
        .bind(holding_period_secs)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(issued_at: DateTime<Utc>) -> DownloadTokenRecord {
        DownloadTokenRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            media_file_id: None,
            movie_id: None,
            display_name: "Some Show S01E01".to_string(),
            filename: "some.show.s01e01.mkv".to_string(),
            path: "/media/tv/Some Show".to_string(),
            is_movie: false,
            issued_at,
        }
    }

    #[test]
    fn test_token_valid_inside_window() {
        let now = Utc::now();
        let t = token(now - Duration::minutes(10));
        assert!(t.is_valid(now, 3 * 60 * 60));
    }

    #[test]
    fn test_token_invalid_after_window() {
        let now = Utc::now();
        let t = token(now - Duration::hours(4));
        assert!(!t.is_valid(now, 3 * 60 * 60));
    }

    #[test]
    fn test_token_invalid_at_exact_boundary() {
        let now = Utc::now();
        let t = token(now - Duration::seconds(3 * 60 * 60));
        assert!(!t.is_valid(now, 3 * 60 * 60));
    }
}
