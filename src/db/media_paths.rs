//! Media path database repository
//!
//! A media path is a directory the waiter serves. Movie paths hang off a
//! movie, TV paths off a show; the (local, remote) pair is unique.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of content stored under a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Movie,
    Tv,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Movie => "movie",
            PathKind::Tv => "tv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(PathKind::Movie),
            "tv" => Some(PathKind::Tv),
            _ => None,
        }
    }
}

/// Media path record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaPathRecord {
    pub id: Uuid,
    pub tv_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub local_path: String,
    pub remote_path: String,
    pub kind: String,
    pub skip: bool,
    pub default_scraper_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a media path
#[derive(Debug)]
pub struct CreateMediaPath {
    pub tv_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub local_path: String,
    pub remote_path: String,
    pub kind: PathKind,
    pub skip: bool,
    pub default_scraper_id: Option<Uuid>,
}

pub struct MediaPathRepository {
    pool: PgPool,
}

impl MediaPathRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a path by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaPathRecord>> {
        let record = sqlx::query_as::<_, MediaPathRecord>(
            r#"
            SELECT id, tv_id, movie_id, local_path, remote_path, kind, skip,
                   default_scraper_id, created_at, updated_at
            FROM media_paths
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Get a path by its (local, remote) pair
    pub async fn get_by_paths(
        &self,
        local_path: &str,
        remote_path: &str,
    ) -> Result<Option<MediaPathRecord>> {
        let record = sqlx::query_as::<_, MediaPathRecord>(
            r#"
            SELECT id, tv_id, movie_id, local_path, remote_path, kind, skip,
                   default_scraper_id, created_at, updated_at
            FROM media_paths
            WHERE local_path = $1 AND remote_path = $2
            "#,
        )
        .bind(local_path)
        .bind(remote_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List all non-skipped paths
    pub async fn list_active(&self) -> Result<Vec<MediaPathRecord>> {
        let records = sqlx::query_as::<_, MediaPathRecord>(
            r#"
            SELECT id, tv_id, movie_id, local_path, remote_path, kind, skip,
                   default_scraper_id, created_at, updated_at
            FROM media_paths
            WHERE skip = false
            ORDER BY local_path
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// List paths belonging to a movie
    pub async fn list_by_movie(&self, movie_id: Uuid) -> Result<Vec<MediaPathRecord>> {
        let records = sqlx::query_as::<_, MediaPathRecord>(
            r#"
            SELECT id, tv_id, movie_id, local_path, remote_path, kind, skip,
                   default_scraper_id, created_at, updated_at
            FROM media_paths
            WHERE movie_id = $1
            ORDER BY local_path
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a new media path
    pub async fn create(&self, input: CreateMediaPath) -> Result<MediaPathRecord> {
        let record = sqlx::query_as::<_, MediaPathRecord>(
            r#"
            INSERT INTO media_paths (tv_id, movie_id, local_path, remote_path, kind, skip, default_scraper_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, tv_id, movie_id, local_path, remote_path, kind, skip,
                      default_scraper_id, created_at, updated_at
            "#,
        )
        .bind(input.tv_id)
        .bind(input.movie_id)
        .bind(&input.local_path)
        .bind(&input.remote_path)
        .bind(input.kind.as_str())
        .bind(input.skip)
        .bind(input.default_scraper_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Toggle the skip flag
    pub async fn set_skip(&self, id: Uuid, skip: bool) -> Result<()> {
        sqlx::query("UPDATE media_paths SET skip = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(skip)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a media path
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_paths WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
