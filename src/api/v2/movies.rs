//! V2 movie listing endpoints

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::{AuthUser, PageQuery, Paginated, PosterPayload};
use crate::db::MovieRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<PosterPayload>,
}

async fn movie_response(state: &AppState, record: MovieRecord) -> anyhow::Result<MovieResponse> {
    let posters = state.db.posters();
    let poster = match posters.get_for(crate::db::PosterOwner::Movie(record.id)).await? {
        Some(p) => Some(PosterPayload::load(&posters, &p).await?),
        None => None,
    };

    Ok(MovieResponse {
        id: record.id,
        name: record.name,
        created_at: record.created_at,
        poster,
    })
}

/// List movies, alphabetical, optionally filtered by genre
async fn list_movies(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<MovieResponse>>> {
    let (limit, offset) = query.limits();
    let movies = state.db.movies();

    let (records, count) = match query.genre {
        Some(genre_id) => (
            movies.list_by_genre(genre_id, limit, offset).await?,
            movies.count_by_genre(genre_id).await?,
        ),
        None => (movies.list(limit, offset).await?, movies.count().await?),
    };

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        results.push(movie_response(&state, record).await?);
    }

    Ok(Json(Paginated {
        count,
        page: query.page.max(1),
        page_size: limit,
        results,
    }))
}

/// Get a single movie with its poster payload
async fn get_movie(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<Json<MovieResponse>> {
    let record = state
        .db
        .movies()
        .get_by_id(movie_id)
        .await?
        .ok_or(ApiError::NotFound("movie"))?;

    Ok(Json(movie_response(&state, record).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
}
