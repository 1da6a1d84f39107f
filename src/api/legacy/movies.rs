//! Legacy movie resource

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyStaff, LegacyUser, ListEnvelope};
use crate::db::{CreateMovie, MovieRecord, UpdateMovie};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MovieItem {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MovieRecord> for MovieItem {
    fn from(r: MovieRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MovieListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieBody {
    pub name: String,
}

async fn list_movies(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Query(query): Query<MovieListQuery>,
) -> ApiResult<Json<ListEnvelope<MovieItem>>> {
    let movies = state.db.movies();

    let records = match query.search.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => movies.search(q, 50).await?,
        _ => movies.list(i64::MAX, 0).await?,
    };

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn get_movie(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<Json<MovieItem>> {
    let record = state
        .db
        .movies()
        .get_by_id(movie_id)
        .await?
        .ok_or(ApiError::NotFound("movie"))?;

    Ok(Json(record.into()))
}

async fn create_movie(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Json(body): Json<CreateMovieBody>,
) -> ApiResult<Json<MovieItem>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let record = state
        .db
        .movies()
        .create(CreateMovie {
            name: name.to_string(),
        })
        .await?;

    Ok(Json(record.into()))
}

async fn patch_movie(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(movie_id): Path<Uuid>,
    Json(body): Json<CreateMovieBody>,
) -> ApiResult<Json<MovieItem>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let record = state
        .db
        .movies()
        .update(
            movie_id,
            UpdateMovie {
                name: Some(name.to_string()),
            },
        )
        .await?
        .ok_or(ApiError::NotFound("movie"))?;

    Ok(Json(record.into()))
}

async fn delete_movie(
    State(state): State<AppState>,
    LegacyStaff(_user): LegacyStaff,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.movies().delete(movie_id).await? {
        return Err(ApiError::NotFound("movie"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/{id}",
            get(get_movie).patch(patch_movie).delete(delete_movie),
        )
}
