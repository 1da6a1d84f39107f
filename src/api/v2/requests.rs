//! V2 media request endpoints
//!
//! Creating a request normalizes the name; a duplicate open request
//! attaches a vote instead of a second row. Marking done notifies every
//! voter through the message inbox.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthUser, StaffUser};
use crate::db::{CreateMessage, CreateRequest, RequestWithVotes};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub name: String,
    pub done: bool,
    pub done_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub vote_count: i64,
    pub can_vote: bool,
}

impl From<RequestWithVotes> for RequestResponse {
    fn from(r: RequestWithVotes) -> Self {
        Self {
            id: r.id,
            name: r.name,
            done: r.done,
            done_at: r.done_at,
            created_at: r.created_at,
            vote_count: r.vote_count,
            can_vote: r.can_vote,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub include_done: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub voted: bool,
    pub vote_count: i64,
}

/// Normalize a request name: trim, collapse whitespace, case-fold
pub fn normalize_request_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Json<Vec<RequestResponse>>> {
    let records = state
        .db
        .requests()
        .list_with_votes(user.id, query.include_done)
        .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Create a request, or vote for the existing open duplicate
async fn create_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<Json<RequestResponse>> {
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
            // The requester's own vote comes free.
            requests.add_vote(created.id, user.id).await?;
            created
        }
    };

    let vote_count = requests.vote_count(record.id).await?;

    Ok(Json(RequestResponse {
        id: record.id,
        name: record.name,
        done: record.done,
        done_at: record.done_at,
        created_at: record.created_at,
        vote_count,
        can_vote: false,
    }))
}

/// Vote for a request; voting twice is a conflict
async fn vote(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<VoteResponse>> {
    let requests = state.db.requests();

    if requests.get_by_id(request_id).await?.is_none() {
        return Err(ApiError::NotFound("request"));
    }

    let voted = requests.add_vote(request_id, user.id).await?;
    if !voted {
        return Err(ApiError::Conflict("already voted".to_string()));
    }

    let vote_count = requests.vote_count(request_id).await?;
    Ok(Json(VoteResponse { voted, vote_count }))
}

/// Mark a request done (staff) and notify everyone who voted
async fn mark_done(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<RequestResponse>> {
    let requests = state.db.requests();

    let record = requests
        .mark_done(request_id)
        .await?
        .ok_or(ApiError::NotFound("request"))?;

    let messages = state.db.messages();
    for voter_id in requests.voter_ids(request_id).await? {
        messages
            .create(CreateMessage {
                user_id: voter_id,
                body: format!("Your request \"{}\" is now available", record.name),
                level: "info".to_string(),
            })
            .await?;
    }

    let vote_count = requests.vote_count(record.id).await?;

    Ok(Json(RequestResponse {
        id: record.id,
        name: record.name,
        done: record.done,
        done_at: record.done_at,
        created_at: record.created_at,
        vote_count,
        can_vote: false,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}/vote", post(vote))
        .route("/requests/{id}/done", put(mark_done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_request_name() {
        assert_eq!(normalize_request_name("  The   Matrix  "), "the matrix");
        assert_eq!(normalize_request_name("Heat (1995)"), "heat (1995)");
        assert_eq!(
            normalize_request_name("THE\tMATRIX"),
            normalize_request_name("the matrix")
        );
    }
}
