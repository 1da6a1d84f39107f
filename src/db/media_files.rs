//! Media file database repository
//!
//! One row per file under a media path. TV files carry season/episode once
//! a scraper has matched the filename; movie files never do.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Media file record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaFileRecord {
    pub id: Uuid,
    pub media_path_id: Uuid,
    pub filename: String,
    pub display_name: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub size: Option<i64>,
    pub hidden: bool,
    pub streamable: bool,
    pub is_movie: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a media file
#[derive(Debug)]
pub struct CreateMediaFile {
    pub media_path_id: Uuid,
    pub filename: String,
    pub display_name: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub size: Option<i64>,
    pub is_movie: bool,
}

/// Input for updating a media file
#[derive(Debug, Default)]
pub struct UpdateMediaFile {
    pub display_name: Option<String>,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub size: Option<i64>,
    pub hidden: Option<bool>,
    pub streamable: Option<bool>,
}

pub struct MediaFileRepository {
    pool: PgPool,
}

impl MediaFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a file by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaFileRecord>> {
        let record = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT id, media_path_id, filename, display_name, season, episode,
                   size, hidden, streamable, is_movie, created_at, updated_at
            FROM media_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List visible files under a path
    pub async fn list_by_path(&self, media_path_id: Uuid) -> Result<Vec<MediaFileRecord>> {
        let records = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT id, media_path_id, filename, display_name, season, episode,
                   size, hidden, streamable, is_movie, created_at, updated_at
            FROM media_files
            WHERE media_path_id = $1 AND hidden = false
            ORDER BY season NULLS LAST, episode NULLS LAST, LOWER(filename)
            "#,
        )
        .bind(media_path_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// List visible files for a TV show across all of its paths
    pub async fn list_by_tv(&self, tv_id: Uuid) -> Result<Vec<MediaFileRecord>> {
        let records = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT f.id, f.media_path_id, f.filename, f.display_name, f.season, f.episode,
                   f.size, f.hidden, f.streamable, f.is_movie, f.created_at, f.updated_at
            FROM media_files f
            JOIN media_paths p ON p.id = f.media_path_id
            WHERE p.tv_id = $1 AND f.hidden = false
            ORDER BY f.season NULLS LAST, f.episode NULLS LAST, LOWER(f.filename)
            "#,
        )
        .bind(tv_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// List visible files for a movie across all of its paths
    pub async fn list_by_movie(&self, movie_id: Uuid) -> Result<Vec<MediaFileRecord>> {
        let records = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT f.id, f.media_path_id, f.filename, f.display_name, f.season, f.episode,
                   f.size, f.hidden, f.streamable, f.is_movie, f.created_at, f.updated_at
            FROM media_files f
            JOIN media_paths p ON p.id = f.media_path_id
            WHERE p.movie_id = $1 AND f.hidden = false
            ORDER BY LOWER(f.filename)
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// TV files a scraper has not yet matched
    pub async fn list_unmatched_tv(&self) -> Result<Vec<MediaFileRecord>> {
        let records = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT id, media_path_id, filename, display_name, season, episode,
                   size, hidden, streamable, is_movie, created_at, updated_at
            FROM media_files
            WHERE is_movie = false AND (season IS NULL OR episode IS NULL)
            ORDER BY LOWER(filename)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Episode files without poster metadata yet
    pub async fn list_missing_posters(&self) -> Result<Vec<MediaFileRecord>> {
        let records = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            SELECT f.id, f.media_path_id, f.filename, f.display_name, f.season, f.episode,
                   f.size, f.hidden, f.streamable, f.is_movie, f.created_at, f.updated_at
            FROM media_files f
            LEFT JOIN posters p ON p.media_file_id = f.id
            WHERE f.is_movie = false
              AND f.season IS NOT NULL AND f.episode IS NOT NULL
              AND (p.id IS NULL OR p.plot IS NULL)
            ORDER BY LOWER(f.filename)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a new media file
    pub async fn create(&self, input: CreateMediaFile) -> Result<MediaFileRecord> {
        let record = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            INSERT INTO media_files (media_path_id, filename, display_name, season, episode, size, is_movie)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, media_path_id, filename, display_name, season, episode,
                      size, hidden, streamable, is_movie, created_at, updated_at
            "#,
        )
        .bind(input.media_path_id)
        .bind(&input.filename)
        .bind(&input.display_name)
        .bind(input.season)
        .bind(input.episode)
        .bind(input.size)
        .bind(input.is_movie)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Update a media file
    pub async fn update(&self, id: Uuid, input: UpdateMediaFile) -> Result<Option<MediaFileRecord>> {
        let record = sqlx::query_as::<_, MediaFileRecord>(
            r#"
            UPDATE media_files SET
                display_name = COALESCE($2, display_name),
                season = COALESCE($3, season),
                episode = COALESCE($4, episode),
                size = COALESCE($5, size),
                hidden = COALESCE($6, hidden),
                streamable = COALESCE($7, streamable),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, media_path_id, filename, display_name, season, episode,
                      size, hidden, streamable, is_movie, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.display_name)
        .bind(input.season)
        .bind(input.episode)
        .bind(input.size)
        .bind(input.hidden)
        .bind(input.streamable)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a media file
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
