//! Legacy waiter status resource

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::LegacyUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WaiterStatusItem {
    /// True when the waiter is currently reachable and healthy
    pub healthy: bool,
    pub status_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// Most recent waiter health snapshot
async fn latest_status(
    State(state): State<AppState>,
    LegacyUser(_user): LegacyUser,
) -> ApiResult<Json<WaiterStatusItem>> {
    let latest = state.waiter.latest().await?;

    Ok(Json(match latest {
        Some(record) => WaiterStatusItem {
            healthy: !record.failed_status,
            status_date: Some(record.status_date),
        },
        None => WaiterStatusItem {
            healthy: false,
            status_date: None,
        },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/waiterstatus", get(latest_status))
}
