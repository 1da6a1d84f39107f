//! TV show database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// TV show record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TvShowRecord {
    pub id: Uuid,
    pub name: String,
    /// Override for metadata lookups when the directory name is unhelpful
    pub search_terms: Option<String>,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TvShowRecord {
    /// The term used when querying the metadata provider
    pub fn search_term(&self) -> &str {
        self.search_terms
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Input for creating a TV show
#[derive(Debug)]
pub struct CreateTvShow {
    pub name: String,
    pub search_terms: Option<String>,
}

/// Input for updating a TV show
#[derive(Debug, Default)]
pub struct UpdateTvShow {
    pub name: Option<String>,
    pub search_terms: Option<String>,
    pub finished: Option<bool>,
}

pub struct TvShowRepository {
    pool: PgPool,
}

impl TvShowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a show by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<TvShowRecord>> {
        let record = sqlx::query_as::<_, TvShowRecord>(
            r#"
            SELECT id, name, search_terms, finished, created_at, updated_at
            FROM tv_shows
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List shows alphabetically, paginated
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<TvShowRecord>> {
        let records = sqlx::query_as::<_, TvShowRecord>(
            r#"
            SELECT id, name, search_terms, finished, created_at, updated_at
            FROM tv_shows
            ORDER BY LOWER(name)
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Total show count
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tv_shows")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// List shows carrying a given genre, paginated
    pub async fn list_by_genre(
        &self,
        genre_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TvShowRecord>> {
        let records = sqlx::query_as::<_, TvShowRecord>(
            r#"
            SELECT t.id, t.name, t.search_terms, t.finished, t.created_at, t.updated_at
            FROM tv_shows t
            JOIN posters p ON p.tv_id = t.id
            JOIN poster_genres pg ON pg.poster_id = p.id
            WHERE pg.genre_id = $1
            ORDER BY LOWER(t.name)
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(genre_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Count of shows carrying a given genre
    pub async fn count_by_genre(&self, genre_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM tv_shows t
            JOIN posters p ON p.tv_id = t.id
            JOIN poster_genres pg ON pg.poster_id = p.id
            WHERE pg.genre_id = $1
            "#,
        )
        .bind(genre_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Search shows by name
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<TvShowRecord>> {
        let search_pattern = format!("%{}%", query.to_lowercase());
        let records = sqlx::query_as::<_, TvShowRecord>(
            r#"
            SELECT id, name, search_terms, finished, created_at, updated_at
            FROM tv_shows
            WHERE LOWER(name) LIKE $1
            ORDER BY LOWER(name)
            LIMIT $2
            "#,
        )
        .bind(&search_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// List shows without any poster metadata yet
    pub async fn list_missing_posters(&self) -> Result<Vec<TvShowRecord>> {
        let records = sqlx::query_as::<_, TvShowRecord>(
            r#"
            SELECT t.id, t.name, t.search_terms, t.finished, t.created_at, t.updated_at
            FROM tv_shows t
            LEFT JOIN posters p ON p.tv_id = t.id
            WHERE p.id IS NULL OR p.plot IS NULL
            ORDER BY LOWER(t.name)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a new show
    pub async fn create(&self, input: CreateTvShow) -> Result<TvShowRecord> {
        let record = sqlx::query_as::<_, TvShowRecord>(
            r#"
            INSERT INTO tv_shows (name, search_terms)
            VALUES ($1, $2)
            RETURNING id, name, search_terms, finished, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.search_terms)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Update a show
    pub async fn update(&self, id: Uuid, input: UpdateTvShow) -> Result<Option<TvShowRecord>> {
        let record = sqlx::query_as::<_, TvShowRecord>(
            r#"
            UPDATE tv_shows SET
                name = COALESCE($2, name),
                search_terms = COALESCE($3, search_terms),
                finished = COALESCE($4, finished),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, search_terms, finished, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.search_terms)
        .bind(input.finished)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a show
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tv_shows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
