//! Legacy API: resource routers under /api with HTTP Basic auth
//!
//! Predates the v2 surface; kept for clients that never migrated. Lists
//! are wrapped in the historical `{count, results}` envelope and errors
//! use the same typed bodies as v2.

pub mod comments;
pub mod download_tokens;
pub mod media_files;
pub mod media_paths;
pub mod movies;
pub mod requests;
pub mod tv_shows;
pub mod video_progress;
pub mod waiter_status;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Router;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde::Serialize;

use crate::db::UserRecord;
use crate::error::ApiError;
use crate::AppState;

/// Extractor for Basic-authenticated legacy callers
pub struct LegacyUser(pub UserRecord);

/// Extractor that additionally requires the staff flag
pub struct LegacyStaff(pub UserRecord);

impl FromRequestParts<AppState> for LegacyUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let user = state
            .auth
            .verify_basic(basic.username(), basic.password())
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(LegacyUser(user))
    }
}

impl FromRequestParts<AppState> for LegacyStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let LegacyUser(user) = LegacyUser::from_request_parts(parts, state).await?;

        if !user.is_staff {
            return Err(ApiError::Forbidden("Staff access required".to_string()));
        }

        Ok(LegacyStaff(user))
    }
}

/// Legacy list envelope
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Assemble the full legacy router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(movies::router())
        .merge(tv_shows::router())
        .merge(media_paths::router())
        .merge(media_files::router())
        .merge(comments::router())
        .merge(video_progress::router())
        .merge(requests::router())
        .merge(waiter_status::router())
        .merge(download_tokens::router())
}
