//! V2 viewed-marker endpoints

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthUser;
use crate::db::UpsertComment;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewedUpdate {
    pub media_file_id: Uuid,
    pub viewed: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkViewedRequest {
    pub updates: Vec<ViewedUpdate>,
}

#[derive(Debug, Serialize)]
pub struct BulkViewedResponse {
    pub updated: usize,
}

/// Bulk set viewed flags for the caller
async fn set_viewed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<BulkViewedRequest>,
) -> ApiResult<Json<BulkViewedResponse>> {
    if body.updates.is_empty() {
        return Err(ApiError::Validation("updates must not be empty".to_string()));
    }

    let files = state.db.media_files();
    let comments = state.db.comments();
    let mut updated = 0;

    for update in &body.updates {
        if files.get_by_id(update.media_file_id).await?.is_none() {
            return Err(ApiError::NotFound("media file"));
        }

        comments
            .upsert(UpsertComment {
                user_id: user.id,
                media_file_id: update.media_file_id,
                viewed: update.viewed,
            })
            .await?;
        updated += 1;
    }

    Ok(Json(BulkViewedResponse { updated }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/comments/viewed", post(set_viewed))
}
