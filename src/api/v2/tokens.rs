//! V2 download token endpoints
//!
//! Issuance is authenticated; redemption is the waiter's callback and is
//! keyed purely by GUID knowledge. Unknown and expired GUIDs are the same
//! 404 so the waiter needs no special casing.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use super::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{IssuedToken, TokenPayload};
use crate::AppState;

/// Issue a token for a media file
async fn issue_file_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(media_file_id): Path<Uuid>,
) -> ApiResult<Json<IssuedToken>> {
    if state.db.media_files().get_by_id(media_file_id).await?.is_none() {
        return Err(ApiError::NotFound("media file"));
    }

    let issued = state.tokens.issue_for_file(user.id, media_file_id).await?;
    Ok(Json(issued))
}

/// Issue a token for a movie
async fn issue_movie_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<Json<IssuedToken>> {
    if state.db.movies().get_by_id(movie_id).await?.is_none() {
        return Err(ApiError::NotFound("movie"));
    }

    let issued = state.tokens.issue_for_movie(user.id, movie_id).await?;
    Ok(Json(issued))
}

/// Redeem a token GUID (called by the waiter)
async fn redeem_token(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
) -> ApiResult<Json<TokenPayload>> {
    let payload = state
        .tokens
        .redeem(guid)
        .await?
        .ok_or(ApiError::NotFound("download token"))?;

    Ok(Json(payload))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/downloadtoken/{id}", post(issue_file_token).get(redeem_token))
        .route("/movie-downloadtoken/{id}", post(issue_movie_token))
}
