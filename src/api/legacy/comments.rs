//! Legacy viewed-marker resource

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyUser, ListEnvelope};
use crate::db::{CommentRecord, UpsertComment};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CommentItem {
    pub id: Uuid,
    pub media_file_id: Uuid,
    pub viewed: bool,
}

impl From<CommentRecord> for CommentItem {
    fn from(r: CommentRecord) -> Self {
        Self {
            id: r.id,
            media_file_id: r.media_file_id,
            viewed: r.viewed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub tv: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpsertCommentBody {
    pub media_file_id: Uuid,
    pub viewed: bool,
}

/// The caller's viewed markers for one show's files
async fn list_comments(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Query(query): Query<CommentListQuery>,
) -> ApiResult<Json<ListEnvelope<CommentItem>>> {
    let files = state.db.media_files().list_by_tv(query.tv).await?;
    let file_ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();

    let records = state.db.comments().get_batch(user.id, &file_ids).await?;

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn upsert_comment(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Json(body): Json<UpsertCommentBody>,
) -> ApiResult<Json<CommentItem>> {
    if state
        .db
        .media_files()
        .get_by_id(body.media_file_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("media file"));
    }

    let record = state
        .db
        .comments()
        .upsert(UpsertComment {
            user_id: user.id,
            media_file_id: body.media_file_id,
            viewed: body.viewed,
        })
        .await?;

    Ok(Json(record.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/comments", get(list_comments).post(upsert_comment))
}
