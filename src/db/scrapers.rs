//! Filename scraper definition database repository
//!
//! Each row is a named triple of regexes (show name, season, episode).
//! Matching walks rows in priority order and stops at the first hit.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Scraper definition record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScraperRecord {
    pub id: Uuid,
    pub name: String,
    pub name_regex: String,
    pub season_regex: String,
    pub episode_regex: String,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a scraper definition
#[derive(Debug)]
pub struct CreateScraper {
    pub name: String,
    pub name_regex: String,
    pub season_regex: String,
    pub episode_regex: String,
    pub priority: i32,
}

pub struct ScraperRepository {
    pool: PgPool,
}

impl ScraperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List definitions in matching order
    pub async fn list_ordered(&self) -> Result<Vec<ScraperRecord>> {
        let records = sqlx::query_as::<_, ScraperRecord>(
            r#"
            SELECT id, name, name_regex, season_regex, episode_regex, priority, created_at
            FROM scrapers
            ORDER BY priority, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Get a definition by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<ScraperRecord>> {
        let record = sqlx::query_as::<_, ScraperRecord>(
            r#"
            SELECT id, name, name_regex, season_regex, episode_regex, priority, created_at
            FROM scrapers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Create a definition
    pub async fn create(&self, input: CreateScraper) -> Result<ScraperRecord> {
        let record = sqlx::query_as::<_, ScraperRecord>(
            r#"
            INSERT INTO scrapers (name, name_regex, season_regex, episode_regex, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, name_regex, season_regex, episode_regex, priority, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.name_regex)
        .bind(&input.season_regex)
        .bind(&input.episode_regex)
        .bind(input.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Delete a definition
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM scrapers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
