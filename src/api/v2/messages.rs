//! V2 in-app message endpoints

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::AuthUser;
use crate::db::MessageRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub body: String,
    pub level: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MessageRecord> for MessageResponse {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: r.id,
            body: r.body,
            level: r.level,
            created_at: r.created_at,
        }
    }
}

/// List the caller's unacknowledged messages
async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let records = state.db.messages().list_pending(user.id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Acknowledge a message; only the recipient may do so
async fn ack_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let messages = state.db.messages();

    let record = messages
        .get_by_id(message_id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    if record.user_id != user.id {
        return Err(ApiError::NotFound("message"));
    }

    let updated = messages
        .mark_sent(message_id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    Ok(Json(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/{id}", put(ack_message))
}
