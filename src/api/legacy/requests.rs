//! Legacy media request resource

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LegacyUser, ListEnvelope};
use crate::api::v2::requests::normalize_request_name;
use crate::db::{CreateRequest, RequestWithVotes};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RequestItem {
    pub id: Uuid,
    pub name: String,
    pub done: bool,
    pub vote_count: i64,
    pub can_vote: bool,
}

impl From<RequestWithVotes> for RequestItem {
    fn from(r: RequestWithVotes) -> Self {
        Self {
            id: r.id,
            name: r.name,
            done: r.done,
            vote_count: r.vote_count,
            can_vote: r.can_vote,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub name: String,
}

async fn list_requests(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
) -> ApiResult<Json<ListEnvelope<RequestItem>>> {
    let records = state.db.requests().list_with_votes(user.id, true).await?;

    Ok(Json(ListEnvelope::new(
        records.into_iter().map(Into::into).collect(),
    )))
}

async fn create_request(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<Json<RequestItem>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let normalized = normalize_request_name(name);
    let requests = state.db.requests();

    let record = match requests.get_open_by_normalized_name(&normalized).await? {
        Some(existing) => {
            requests.add_vote(existing.id, user.id).await?;
            existing
        }
        None => {
            let created = requests
                .create(CreateRequest {
                    user_id: user.id,
                    name: name.to_string(),
                    normalized_name: normalized,
                })
                .await?;
            requests.add_vote(created.id, user.id).await?;
            created
        }
    };

    let vote_count = requests.vote_count(record.id).await?;

    Ok(Json(RequestItem {
        id: record.id,
        name: record.name,
        done: record.done,
        vote_count,
        can_vote: false,
    }))
}

async fn vote(
    State(state): State<AppState>,
    LegacyUser(user): LegacyUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let requests = state.db.requests();

    if requests.get_by_id(request_id).await?.is_none() {
        return Err(ApiError::NotFound("request"));
    }

    let voted = requests.add_vote(request_id, user.id).await?;
    let vote_count = requests.vote_count(request_id).await?;

    Ok(Json(serde_json::json!({
        "voted": voted,
        "vote_count": vote_count,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}/vote", post(vote))
}
