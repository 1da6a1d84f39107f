//! V2 auth endpoints: login, refresh, logout, password reset

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::AuthTokens;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserInfo,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: uuid::Uuid,
    pub username: String,
    pub is_staff: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let result = state
        .auth
        .login(&body.username, &body.password)
        .await
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(LoginResponse {
        user: UserInfo {
            id: result.user.id,
            username: result.user.username,
            is_staff: result.user.is_staff,
        },
        tokens: result.tokens,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = state
        .auth
        .refresh_token(&body.refresh_token)
        .await
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(tokens))
}

async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.auth.logout(&body.refresh_token).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Start a password reset. Always answers ok so callers cannot probe
/// which emails exist.
async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> ApiResult<Json<OkResponse>> {
    if body.email.trim().is_empty() {
        return Err(ApiError::Validation("email is required".to_string()));
    }

    state.auth.request_password_reset(&body.email).await?;
    Ok(Json(OkResponse { ok: true }))
}

async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> ApiResult<Json<OkResponse>> {
    if body.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    state
        .auth
        .confirm_password_reset(&body.token, &body.new_password)
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(OkResponse { ok: true }))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<OkResponse>> {
    if body.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    state
        .auth
        .change_password(user.id, &body.current_password, &body.new_password)
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(OkResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/password-reset/confirm", post(password_reset_confirm))
        .route("/auth/change-password", post(change_password))
}
