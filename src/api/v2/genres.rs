//! V2 genre listing endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub id: Uuid,
    pub name: String,
}

/// Genres present anywhere in the catalog
async fn list_genres(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Json<Vec<GenreResponse>>> {
    let records = state.db.posters().list_catalog_genres().await?;

    Ok(Json(
        records
            .into_iter()
            .map(|g| GenreResponse {
                id: g.id,
                name: g.name,
            })
            .collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/genres", get(list_genres))
}
