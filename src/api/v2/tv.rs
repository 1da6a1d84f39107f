//! V2 TV show endpoints
//!
//! Show listings mirror the movie surface; the per-show files endpoint
//! annotates every episode with the caller's viewed state so clients can
//! render watch markers without a second round trip.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::{AuthUser, PageQuery, Paginated, PosterPayload};
use crate::db::{PosterOwner, TvShowRecord};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TvShowResponse {
    pub id: Uuid,
    pub name: String,
    pub finished: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<PosterPayload>,
}

#[derive(Debug, Serialize)]
pub struct MediaFileResponse {
    pub id: Uuid,
    pub filename: String,
    pub display_name: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub size: Option<i64>,
    pub streamable: bool,
    pub viewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<PosterPayload>,
}

async fn tv_response(state: &AppState, record: TvShowRecord) -> anyhow::Result<TvShowResponse> {
    let posters = state.db.posters();
    let poster = match posters.get_for(PosterOwner::Tv(record.id)).await? {
        Some(p) => Some(PosterPayload::load(&posters, &p).await?),
        None => None,
    };

    Ok(TvShowResponse {
        id: record.id,
        name: record.name,
        finished: record.finished,
        created_at: record.created_at,
        poster,
    })
}

/// List TV shows, alphabetical, optionally filtered by genre
async fn list_tv(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<TvShowResponse>>> {
    let (limit, offset) = query.limits();
    let tv_shows = state.db.tv_shows();

    let (records, count) = match query.genre {
        Some(genre_id) => (
            tv_shows.list_by_genre(genre_id, limit, offset).await?,
            tv_shows.count_by_genre(genre_id).await?,
        ),
        None => (tv_shows.list(limit, offset).await?, tv_shows.count().await?),
    };

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        results.push(tv_response(&state, record).await?);
    }

    Ok(Json(Paginated {
        count,
        page: query.page.max(1),
        page_size: limit,
        results,
    }))
}

/// Get a single show with its poster payload
async fn get_tv(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(tv_id): Path<Uuid>,
) -> ApiResult<Json<TvShowResponse>> {
    let record = state
        .db
        .tv_shows()
        .get_by_id(tv_id)
        .await?
        .ok_or(ApiError::NotFound("tv show"))?;

    Ok(Json(tv_response(&state, record).await?))
}

/// List a show's episode files with the caller's viewed markers
async fn get_tv_files(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(tv_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MediaFileResponse>>> {
    if state.db.tv_shows().get_by_id(tv_id).await?.is_none() {
        return Err(ApiError::NotFound("tv show"));
    }

    let files = state.db.media_files().list_by_tv(tv_id).await?;

    let file_ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();
    let viewed: HashMap<Uuid, bool> = state
        .db
        .comments()
        .get_batch(user.id, &file_ids)
        .await?
        .into_iter()
        .map(|c| (c.media_file_id, c.viewed))
        .collect();

    let posters = state.db.posters();
    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let poster = match posters.get_for(PosterOwner::MediaFile(file.id)).await? {
            Some(p) => Some(PosterPayload::load(&posters, &p).await?),
            None => None,
        };

        results.push(MediaFileResponse {
            id: file.id,
            filename: file.filename,
            display_name: file.display_name,
            season: file.season,
            episode: file.episode,
            size: file.size,
            streamable: file.streamable,
            viewed: viewed.get(&file.id).copied().unwrap_or(false),
            poster,
        });
    }

    Ok(Json(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tv", get(list_tv))
        .route("/tv/{id}", get(get_tv))
        .route("/tv/{id}/files", get(get_tv_files))
}
