//! V2 video progress endpoints
//!
//! Keyed by hashed filename. PUT upserts; DELETE finishes playback, which
//! also flips the viewed marker when the file is known.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub hashed_filename: String,
    pub offset_secs: f64,
    pub date_edited: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub offset_secs: f64,
    pub media_file_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    /// Total duration, when the player knows it; enables auto-finish
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FinishedResponse {
    pub finished: bool,
}

async fn get_progress(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(hashed_filename): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let record = state
        .progress
        .get(user.id, &hashed_filename)
        .await?
        .ok_or(ApiError::NotFound("video progress"))?;

    Ok(Json(ProgressResponse {
        hashed_filename: record.hashed_filename,
        offset_secs: record.offset_secs,
        date_edited: record.date_edited,
    }))
}

async fn put_progress(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(hashed_filename): Path<String>,
    Json(body): Json<ProgressUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    if hashed_filename.trim().is_empty() {
        return Err(ApiError::Validation("hashed filename is required".to_string()));
    }
    if body.offset_secs < 0.0 {
        return Err(ApiError::Validation("offset must not be negative".to_string()));
    }

    let record = state
        .progress
        .record(
            user.id,
            &hashed_filename,
            body.offset_secs,
            body.media_file_id,
            body.movie_id,
            body.duration_secs,
        )
        .await?;

    // A None here means playback crossed the finished threshold and the
    // row was destroyed.
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
    AuthUser(user): AuthUser,
    Path(hashed_filename): Path<String>,
) -> ApiResult<Json<FinishedResponse>> {
    state.progress.finish(user.id, &hashed_filename, None).await?;
    Ok(Json(FinishedResponse { finished: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/progress/{hashed_filename}",
        get(get_progress).put(put_progress).delete(delete_progress),
    )
}
