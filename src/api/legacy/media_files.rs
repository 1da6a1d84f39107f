//! Legacy media file resource

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyStaff, LegacyUser, ListEnvelope};
use crate::db::{MediaFileRecord, UpdateMediaFile};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MediaFileItem {
    pub id: Uuid,
    pub media_path_id: Uuid,
    pub filename: String,
    pub display_name: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub size: Option<i64>,
    pub hidden: bool,
    pub streamable: bool,
    pub ismovie: bool,
}

impl From<MediaFileRecord> for MediaFileItem {
    fn from(r: MediaFileRecord) -> Self {
        Self {
            id: r.id,
            media_path_id: r.media_path_id,
            filename: r.filename,
            display_name: r.display_name,
            season: r.season,
            episode: r.episode,
            size: r.size,
            hidden: r.hidden,
            streamable: r.streamable,
            ismovie: r.is_movie,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaFileListQuery {
    pub path: Option<Uuid>,
    pub tv: Option<Uuid>,
    pub movie: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMediaFileBody {
    pub display_name: Option<String>,
    pub hidden: Option<bool>,
    pub streamable: Option<bool>,
}

/// List files by path, show, or movie (exactly one filter)
async fn list_media_files(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Query(query): Query<MediaFileListQuery>,
) -> ApiResult<Json<ListEnvelope<MediaFileItem>>> {
    let files = state.db.media_files();

    let records = match (query.path, query.tv, query.movie) {
        (Some(path_id), None, None) => files.list_by_path(path_id).await?,
        (None, Some(tv_id), None) => files.list_by_tv(tv_id).await?,
        (None, None, Some(movie_id)) => files.list_by_movie(movie_id).await?,
        _ => {
            return Err(ApiError::Validation(
                "exactly one of path, tv, or movie is required".to_string(),
            ));
        }
    };

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn get_media_file(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<MediaFileItem>> {
    let record = state
        .db
        .media_files()
        .get_by_id(file_id)
        .await?
        .ok_or(ApiError::NotFound("media file"))?;

    Ok(Json(record.into()))
}

async fn patch_media_file(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(file_id): Path<Uuid>,
    Json(body): Json<UpdateMediaFileBody>,
) -> ApiResult<Json<MediaFileItem>> {
    let record = state
        .db
        .media_files()
        .update(
            file_id,
            UpdateMediaFile {
                display_name: body.display_name,
                hidden: body.hidden,
                streamable: body.streamable,
                ..Default::default()
            },
        )
        .await?
        .ok_or(ApiError::NotFound("media file"))?;

    Ok(Json(record.into()))
}

async fn delete_media_file(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.media_files().delete(file_id).await? {
        return Err(ApiError::NotFound("media file"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mediafiles", get(list_media_files))
        .route(
            "/mediafiles/{id}",
            get(get_media_file)
                .patch(patch_media_file)
                .delete(delete_media_file),
        )
}
