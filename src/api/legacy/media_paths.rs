//! Legacy media path resource

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyStaff, LegacyUser, ListEnvelope};
use crate::db::{CreateMediaPath, MediaPathRecord, PathKind};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MediaPathItem {
    pub id: Uuid,
    pub tv_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub local_path: String,
    pub remote_path: String,
    pub kind: String,
    pub skip: bool,
}

impl From<MediaPathRecord> for MediaPathItem {
    fn from(r: MediaPathRecord) -> Self {
        Self {
            id: r.id,
            tv_id: r.tv_id,
            movie_id: r.movie_id,
            local_path: r.local_path,
            remote_path: r.remote_path,
            kind: r.kind,
            skip: r.skip,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMediaPathBody {
    pub tv_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub local_path: String,
    pub remote_path: String,
    pub kind: String,
    pub default_scraper_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PatchMediaPathBody {
    pub skip: bool,
}

async fn list_media_paths(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
) -> ApiResult<Json<ListEnvelope<MediaPathItem>>> {
    let records = state.db.media_paths().list_active().await?;

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn create_media_path(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Json(body): Json<CreateMediaPathBody>,
) -> ApiResult<Json<MediaPathItem>> {
    let kind = PathKind::from_str(&body.kind)
        .ok_or_else(|| ApiError::Validation("kind must be 'movie' or 'tv'".to_string()))?;

    if body.local_path.trim().is_empty() || body.remote_path.trim().is_empty() {
        return Err(ApiError::Validation(
            "local_path and remote_path are required".to_string(),
        ));
    }

    let paths = state.db.media_paths();

    // The (local, remote) pair is unique; a duplicate is a conflict, not a
    // second row.
    if paths
        .get_by_paths(&body.local_path, &body.remote_path)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("path already registered".to_string()));
    }

    let record = paths
        .create(CreateMediaPath {
            tv_id: body.tv_id,
            movie_id: body.movie_id,
            local_path: body.local_path,
            remote_path: body.remote_path,
            kind,
            skip: false,
            default_scraper_id: body.default_scraper_id,
        })
        .await?;

    Ok(Json(record.into()))
}

async fn patch_media_path(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(path_id): Path<Uuid>,
    Json(body): Json<PatchMediaPathBody>,
) -> ApiResult<Json<MediaPathItem>> {
    let paths = state.db.media_paths();

    if paths.get_by_id(path_id).await?.is_none() {
        return Err(ApiError::NotFound("media path"));
    }

    paths.set_skip(path_id, body.skip).await?;

    let record = paths
        .get_by_id(path_id)
        .await?
        .ok_or(ApiError::NotFound("media path"))?;

    Ok(Json(record.into()))
}

async fn delete_media_path(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(path_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.media_paths().delete(path_id).await? {
        return Err(ApiError::NotFound("media path"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mediapaths", get(list_media_paths).post(create_media_path))
        .route(
            "/mediapaths/{id}",
            axum::routing::patch(patch_media_path).delete(delete_media_path),
        )
}
