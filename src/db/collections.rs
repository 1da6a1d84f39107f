//! Collection database repository
//!
//! User-curated groupings of movies and shows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Collection record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a collection
#[derive(Debug)]
pub struct CreateCollection {
    pub user_id: Uuid,
    pub name: String,
}

pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a collection by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<CollectionRecord>> {
        let record = sqlx::query_as::<_, CollectionRecord>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM collections
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List collections owned by a user
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CollectionRecord>> {
        let records = sqlx::query_as::<_, CollectionRecord>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM collections
            WHERE user_id = $1
            ORDER BY LOWER(name)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a collection
    pub async fn create(&self, input: CreateCollection) -> Result<CollectionRecord> {
        let record = sqlx::query_as::<_, CollectionRecord>(
            r#"
            INSERT INTO collections (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Add a movie to a collection
    pub async fn add_movie(&self, collection_id: Uuid, movie_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO collection_movies (collection_id, movie_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(collection_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add a TV show to a collection
    pub async fn add_tv(&self, collection_id: Uuid, tv_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO collection_tv (collection_id, tv_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(collection_id)
        .bind(tv_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a movie from a collection
    pub async fn remove_movie(&self, collection_id: Uuid, movie_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM collection_movies WHERE collection_id = $1 AND movie_id = $2",
        )
        .bind(collection_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a TV show from a collection
    pub async fn remove_tv(&self, collection_id: Uuid, tv_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM collection_tv WHERE collection_id = $1 AND tv_id = $2")
                .bind(collection_id)
                .bind(tv_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Movie IDs in a collection
    pub async fn movie_ids(&self, collection_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT movie_id FROM collection_movies WHERE collection_id = $1")
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    /// TV show IDs in a collection
    pub async fn tv_ids(&self, collection_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT tv_id FROM collection_tv WHERE collection_id = $1")
                .bind(collection_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    /// Delete a collection
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
