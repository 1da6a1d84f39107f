//! Legacy video progress resource

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LegacyUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressItem {
    pub hashed_filename: String,
    pub offset_secs: f64,
    pub date_edited: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertProgressBody {
    pub hashed_filename: String,
    pub offset_secs: f64,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
}

async fn get_progress(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Path(hashed_filename): Path<String>,
) -> ApiResult<Json<ProgressItem>> {
    let record = state
        .progress
        .get(user.id, &hashed_filename)
        .await?
        .ok_or(ApiError::NotFound("video progress"))?;

    Ok(Json(ProgressItem {
        hashed_filename: record.hashed_filename,
        offset_secs: record.offset_secs,
        date_edited: record.date_edited,
    }))
}

async fn post_progress(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Json(body): Json<UpsertProgressBody>,
) -> ApiResult<Json<serde_json::Value>> {
    if body.hashed_filename.trim().is_empty() {
        return Err(ApiError::Validation("hashed_filename is required".to_string()));
    }
    if body.offset_secs < 0.0 {
        return Err(ApiError::Validation("offset must not be negative".to_string()));
    }

    let record = state
        .progress
        .record(
            user.id,
            &body.hashed_filename,
            body.offset_secs,
            body.media_file_id,
            body.movie_id,
            None,
        )
        .await?;

    match record {
        Some(r) => Ok(Json(serde_json::json!({
            "hashed_filename": r.hashed_filename,
            "offset_secs": r.offset_secs,
            "date_edited": r.date_edited,
        }))),
        None => Ok(Json(serde_json::json!({ "finished": true }))),
    }
}

async fn delete_progress(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Path(hashed_filename): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.progress.finish(user.id, &hashed_filename, None).await?;
    Ok(Json(serde_json::json!({ "finished": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videoprogress", axum::routing::post(post_progress))
        .route(
            "/videoprogress/{hashed_filename}",
            get(get_progress).delete(delete_progress),
        )
}
