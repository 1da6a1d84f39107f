//! Legacy download token redemption
//!
//! Waiters deployed before the v2 API redeem GUIDs here. The payload is
//! identical to the v2 response.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::TokenPayload;
use crate::AppState;

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
    Router::new().route("/downloadtoken/{guid}", get(redeem_token))
}
