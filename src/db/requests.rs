//! Media request and vote database repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Request record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vote record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestVoteRecord {
    pub id: Uuid,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request with its vote count and whether a given user may still vote
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestWithVotes {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vote_count: i64,
    pub can_vote: bool,
}

/// Input for creating a request
#[derive(Debug)]
pub struct CreateRequest {
    pub user_id: Uuid,
    pub name: String,
    pub normalized_name: String,
}

pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a request by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<RequestRecord>> {
        let record = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, user_id, name, normalized_name, done, done_at, created_at, updated_at
            FROM requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Find an open request by its normalized name
    pub async fn get_open_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<RequestRecord>> {
        let record = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, user_id, name, normalized_name, done, done_at, created_at, updated_at
            FROM requests
            WHERE normalized_name = $1 AND done = false
            "#,
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// List requests with vote counts, newest first, annotated for a viewer
    pub async fn list_with_votes(
        &self,
        viewer_id: Uuid,
        include_done: bool,
    ) -> Result<Vec<RequestWithVotes>> {
        let records = sqlx::query_as::<_, RequestWithVotes>(
            r#"
            SELECT r.id, r.user_id, r.name, r.normalized_name, r.done, r.done_at,
                   r.created_at, r.updated_at,
                   COUNT(v.id) AS vote_count,
                   NOT EXISTS (
                       SELECT 1 FROM request_votes mv
                       WHERE mv.request_id = r.id AND mv.user_id = $1
                   ) AS can_vote
            FROM requests r
            LEFT JOIN request_votes v ON v.request_id = r.id
            WHERE ($2 OR r.done = false)
            GROUP BY r.id
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(viewer_id)
        .bind(include_done)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Create a new request
    pub async fn create(&self, input: CreateRequest) -> Result<RequestRecord> {
        let record = sqlx::query_as::<_, RequestRecord>(
            r#"
            INSERT INTO requests (user_id, name, normalized_name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, normalized_name, done, done_at, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(&input.normalized_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Record a vote; returns false when the user already voted
    pub async fn add_vote(&self, request_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO request_votes (request_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (request_id, user_id) DO NOTHING
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Vote count for a request
    pub async fn vote_count(&self, request_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM request_votes WHERE request_id = $1")
                .bind(request_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Users who voted for a request (for completion notification)
    pub async fn voter_ids(&self, request_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM request_votes WHERE request_id = $1")
                .bind(request_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    /// Mark a request done
    pub async fn mark_done(&self, id: Uuid) -> Result<Option<RequestRecord>> {
        let record = sqlx::query_as::<_, RequestRecord>(
            r#"
            UPDATE requests SET
                done = true,
                done_at = COALESCE(done_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, normalized_name, done, done_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

}
