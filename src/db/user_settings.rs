//! Per-user settings database repository
//!
//! One row per user, created on first read.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User settings record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSettingsRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub binge_mode: bool,
    pub jump_to_last_watched: bool,
    pub last_watched_tv_id: Option<Uuid>,
    pub site_theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating settings
#[derive(Debug, Default)]
pub struct UpdateUserSettings {
    pub binge_mode: Option<bool>,
    pub jump_to_last_watched: Option<bool>,
    pub last_watched_tv_id: Option<Uuid>,
    pub site_theme: Option<String>,
}

pub struct UserSettingsRepository {
    pool: PgPool,
}

impl UserSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get settings for a user, creating the default row if absent
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<UserSettingsRecord> {
        let record = sqlx::query_as::<_, UserSettingsRecord>(
            r#"
            INSERT INTO user_settings (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, binge_mode, jump_to_last_watched, last_watched_tv_id,
                      site_theme, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Update settings for a user
    pub async fn update(
        &self,
        user_id: Uuid,
        input: UpdateUserSettings,
    ) -> Result<UserSettingsRecord> {
        // Ensure the row exists before the partial update.
        self.get_or_create(user_id).await?;

        let record = sqlx::query_as::<_, UserSettingsRecord>(
            r#"
            UPDATE user_settings SET
                binge_mode = COALESCE($2, binge_mode),
                jump_to_last_watched = COALESCE($3, jump_to_last_watched),
                last_watched_tv_id = COALESCE($4, last_watched_tv_id),
                site_theme = COALESCE($5, site_theme),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING id, user_id, binge_mode, jump_to_last_watched, last_watched_tv_id,
                      site_theme, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.binge_mode)
        .bind(input.jump_to_last_watched)
        .bind(input.last_watched_tv_id)
        .bind(&input.site_theme)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Record the show a user last watched
    pub async fn set_last_watched(&self, user_id: Uuid, tv_id: Uuid) -> Result<()> {
        self.get_or_create(user_id).await?;

        sqlx::query(
            "UPDATE user_settings SET last_watched_tv_id = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(tv_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
