//! V2 per-user settings endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthUser;
use crate::db::{UpdateUserSettings, UserSettingsRecord};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const VALID_THEMES: &[&str] = &["light", "dark", "auto"];

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub binge_mode: bool,
    pub jump_to_last_watched: bool,
    pub last_watched_tv_id: Option<Uuid>,
    pub site_theme: String,
}

impl From<UserSettingsRecord> for SettingsResponse {
    fn from(r: UserSettingsRecord) -> Self {
        Self {
            binge_mode: r.binge_mode,
            jump_to_last_watched: r.jump_to_last_watched,
            last_watched_tv_id: r.last_watched_tv_id,
            site_theme: r.site_theme,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub binge_mode: Option<bool>,
    pub jump_to_last_watched: Option<bool>,
    pub site_theme: Option<String>,
}

async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<SettingsResponse>> {
    let record = state.db.user_settings().get_or_create(user.id).await?;
    Ok(Json(record.into()))
}

async fn put_settings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<SettingsUpdate>,
) -> ApiResult<Json<SettingsResponse>> {
    if let Some(theme) = &body.site_theme
        && !VALID_THEMES.contains(&theme.as_str())
    {
        return Err(ApiError::Validation(format!(
            "site_theme must be one of: {}",
            VALID_THEMES.join(", ")
        )));
    }

    let record = state
        .db
        .user_settings()
        .update(
            user.id,
            UpdateUserSettings {
                binge_mode: body.binge_mode,
                jump_to_last_watched: body.jump_to_last_watched,
                last_watched_tv_id: None,
                site_theme: body.site_theme,
            },
        )
        .await?;

    Ok(Json(record.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}
