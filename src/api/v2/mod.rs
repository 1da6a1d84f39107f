//! V2 API: function-style handlers with JWT bearer auth
//!
//! Every error body is `{"error": {"code": ..., "message": ...}}`; see
//! [`crate::error::ApiError`].

pub mod admin;
pub mod auth;
pub mod collections;
pub mod comments;
pub mod genres;
pub mod messages;
pub mod movies;
pub mod progress;
pub mod requests;
pub mod settings;
pub mod tokens;
pub mod tv;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Router;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{PosterRecord, PosterRepository};
use crate::error::ApiError;
use crate::services::AuthenticatedUser;
use crate::AppState;

/// Extractor for any authenticated caller
pub struct AuthUser(pub AuthenticatedUser);

/// Extractor that additionally requires the staff flag
pub struct StaffUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let user = state
            .auth
            .validate_access_token(bearer.token())
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_staff {
            return Err(ApiError::Forbidden("Staff access required".to_string()));
        }

        Ok(StaffUser(user))
    }
}

/// Standard pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Optional genre filter
    pub genre: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    50
}

impl PageQuery {
    /// Clamp to sane bounds and convert to LIMIT/OFFSET
    pub fn limits(&self) -> (i64, i64) {
        let page = self.page.max(1);
        let page_size = self.page_size.clamp(1, 200);
        (page_size, (page - 1) * page_size)
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}

/// Poster payload embedded in listing responses
#[derive(Debug, Serialize)]
pub struct PosterPayload {
    pub plot: Option<String>,
    pub extended_plot: Option<String>,
    pub release_date: Option<chrono::NaiveDate>,
    pub rating: Option<rust_decimal::Decimal>,
    pub rated: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i32>,
    pub episode_name: Option<String>,
    pub image_url: Option<String>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub writers: Vec<String>,
    pub directors: Vec<String>,
}

impl PosterPayload {
    /// Assemble the payload for a poster row, loading its associations
    pub async fn load(repo: &PosterRepository, record: &PosterRecord) -> anyhow::Result<Self> {
        let genres = repo.genres_for(record.id).await?;
        let actors = repo.actors_for(record.id).await?;
        let writers = repo.writers_for(record.id).await?;
        let directors = repo.directors_for(record.id).await?;

        Ok(Self {
            plot: record.plot.clone(),
            extended_plot: record.extended_plot.clone(),
            release_date: record.release_date,
            rating: record.rating,
            rated: record.rated.clone(),
            imdb_id: record.imdb_id.clone(),
            tmdb_id: record.tmdb_id,
            episode_name: record.episode_name.clone(),
            image_url: record.image_url.clone(),
            genres: genres.into_iter().map(|g| g.name).collect(),
            actors: actors.into_iter().map(|a| a.name).collect(),
            writers: writers.into_iter().map(|w| w.name).collect(),
            directors: directors.into_iter().map(|d| d.name).collect(),
        })
    }
}

/// Assemble the full v2 router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(movies::router())
        .merge(tv::router())
        .merge(comments::router())
        .merge(progress::router())
        .merge(tokens::router())
        .merge(requests::router())
        .merge(settings::router())
        .merge(messages::router())
        .merge(collections::router())
        .merge(genres::router())
        .merge(admin::router())
}
