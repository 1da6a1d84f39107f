//! Movie database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Movie record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovieRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a movie
#[derive(Debug)]
pub struct CreateMovie {
    pub name: String,
}

/// Input for updating a movie
#[derive(Debug, Default)]
pub struct UpdateMovie {
    pub name: Option<String>,
}

pub struct MovieRepository {
    pool: PgPool,
}

impl MovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a movie by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<MovieRecord>> {
        let record = sqlx::query_as::<_, MovieRecord>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List movies alphabetically, paginated
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<MovieRecord>> {
        let records = sqlx::query_as::<_, MovieRecord>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM movies
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

    /// Total movie count
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// List movies carrying a given genre, paginated
    pub async fn list_by_genre(
        &self,
        genre_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MovieRecord>> {
        let records = sqlx::query_as::<_, MovieRecord>(
            r#"
            SELECT m.id, m.name, m.created_at, m.updated_at
            FROM movies m
            JOIN posters p ON p.movie_id = m.id
            JOIN poster_genres pg ON pg.poster_id = p.id
            WHERE pg.genre_id = $1
            ORDER BY LOWER(m.name)
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

    /// Count of movies carrying a given genre
    pub async fn count_by_genre(&self, genre_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM movies m
            JOIN posters p ON p.movie_id = m.id
            JOIN poster_genres pg ON pg.poster_id = p.id
            WHERE pg.genre_id = $1
            "#,
        )
        .bind(genre_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Search movies by name
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<MovieRecord>> {
        let search_pattern = format!("%{}%", query.to_lowercase());
        let records = sqlx::query_as::<_, MovieRecord>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM movies
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

    /// List movies without any poster metadata yet
    pub async fn list_missing_posters(&self) -> Result<Vec<MovieRecord>> {
        let records = sqlx::query_as::<_, MovieRecord>(
            r#"
            SELECT m.id, m.name, m.created_at, m.updated_at
            FROM movies m
            LEFT JOIN posters p ON p.movie_id = m.id
            WHERE p.id IS NULL OR p.plot IS NULL
            ORDER BY LOWER(m.name)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a new movie
    pub async fn create(&self, input: CreateMovie) -> Result<MovieRecord> {
        let record = sqlx::query_as::<_, MovieRecord>(
            r#"
            INSERT INTO movies (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Update a movie
    pub async fn update(&self, id: Uuid, input: UpdateMovie) -> Result<Option<MovieRecord>> {
        let record = sqlx::query_as::<_, MovieRecord>(
            r#"
            UPDATE movies SET
                name = COALESCE($2, name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a movie
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
