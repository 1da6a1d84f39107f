//! Legacy TV show resource

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyStaff, LegacyUser, ListEnvelope};
use crate::db::{CreateTvShow, TvShowRecord, UpdateTvShow};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TvShowItem {
    pub id: Uuid,
    pub name: String,
    pub finished: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TvShowRecord> for TvShowItem {
    fn from(r: TvShowRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            finished: r.finished,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TvListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTvShowBody {
    pub name: String,
    pub search_terms: Option<String>,
}

async fn list_tv_shows(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Query(query): Query<TvListQuery>,
) -> ApiResult<Json<ListEnvelope<TvShowItem>>> {
    let tv_shows = state.db.tv_shows();

    let records = match query.search.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => tv_shows.search(q, 50).await?,
        _ => tv_shows.list(i64::MAX, 0).await?,
    };

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn get_tv_show(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Path(tv_id): Path<Uuid>,
) -> ApiResult<Json<TvShowItem>> {
    let record = state
        .db
        .tv_shows()
        .get_by_id(tv_id)
        .await?
        .ok_or(ApiError::NotFound("tv show"))?;

    Ok(Json(record.into()))
}

async fn create_tv_show(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Json(body): Json<CreateTvShowBody>,
) -> ApiResult<Json<TvShowItem>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let record = state
        .db
        .tv_shows()
        .create(CreateTvShow {
            name: name.to_string(),
            search_terms: body.search_terms,
        })
        .await?;

    Ok(Json(record.into()))
}

#[derive(Debug, Deserialize)]
pub struct PatchTvShowBody {
    pub name: Option<String>,
    pub search_terms: Option<String>,
    pub finished: Option<bool>,
}

async fn patch_tv_show(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(tv_id): Path<Uuid>,
    Json(body): Json<PatchTvShowBody>,
) -> ApiResult<Json<TvShowItem>> {
    let record = state
        .db
        .tv_shows()
        .update(
            tv_id,
            UpdateTvShow {
                name: body.name,
                search_terms: body.search_terms,
                finished: body.finished,
            },
        )
        .await?
        .ok_or(ApiError::NotFound("tv show"))?;

    Ok(Json(record.into()))
}

async fn delete_tv_show(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(tv_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.tv_shows().delete(tv_id).await? {
        return Err(ApiError::NotFound("tv show"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tvshows", get(list_tv_shows).post(create_tv_show))
        .route(
            "/tvshows/{id}",
            get(get_tv_show).patch(patch_tv_show).delete(delete_tv_show),
        )
}
