//! V2 collection endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthUser;
use crate::db::{CollectionRecord, CreateCollection};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CollectionRecord> for CollectionResponse {
    fn from(r: CollectionRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub movie_ids: Vec<Uuid>,
    pub tv_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub movie_id: Option<Uuid>,
    pub tv_id: Option<Uuid>,
}

async fn list_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<CollectionResponse>>> {
    let records = state.db.collections().list_by_user(user.id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn create_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateCollectionBody>,
) -> ApiResult<Json<CollectionResponse>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let record = state
        .db
        .collections()
        .create(CreateCollection {
            user_id: user.id,
            name: name.to_string(),
        })
        .await?;

    Ok(Json(record.into()))
}

async fn owned_collection(
    state: &AppState,
    user_id: Uuid,
    collection_id: Uuid,
) -> ApiResult<CollectionRecord> {
    let record = state
        .db
        .collections()
        .get_by_id(collection_id)
        .await?
        .ok_or(ApiError::NotFound("collection"))?;

    // Collections are private; other users' collections look absent.
    if record.user_id != user_id {
        return Err(ApiError::NotFound("collection"));
    }

    Ok(record)
}

async fn get_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<Json<CollectionDetailResponse>> {
    let record = owned_collection(&state, user.id, collection_id).await?;

    let collections = state.db.collections();
    let movie_ids = collections.movie_ids(collection_id).await?;
    let tv_ids = collections.tv_ids(collection_id).await?;

    Ok(Json(CollectionDetailResponse {
        id: record.id,
        name: record.name,
        created_at: record.created_at,
        movie_ids,
        tv_ids,
    }))
}

async fn add_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(collection_id): Path<Uuid>,
    Json(body): Json<AddItemBody>,
) -> ApiResult<Json<CollectionResponse>> {
    let record = owned_collection(&state, user.id, collection_id).await?;

    let collections = state.db.collections();
    match (body.movie_id, body.tv_id) {
        (Some(movie_id), None) => {
            if state.db.movies().get_by_id(movie_id).await?.is_none() {
                return Err(ApiError::NotFound("movie"));
            }
            collections.add_movie(collection_id, movie_id).await?;
        }
        (None, Some(tv_id)) => {
            if state.db.tv_shows().get_by_id(tv_id).await?.is_none() {
                return Err(ApiError::NotFound("tv show"));
            }
            collections.add_tv(collection_id, tv_id).await?;
        }
        _ => {
            return Err(ApiError::Validation(
                "exactly one of movie_id or tv_id is required".to_string(),
            ));
        }
    }

    Ok(Json(record.into()))
}

async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(collection_id): Path<Uuid>,
    Json(body): Json<AddItemBody>,
) -> ApiResult<Json<serde_json::Value>> {
    owned_collection(&state, user.id, collection_id).await?;

    let collections = state.db.collections();
    let removed = match (body.movie_id, body.tv_id) {
        (Some(movie_id), None) => collections.remove_movie(collection_id, movie_id).await?,
        (None, Some(tv_id)) => collections.remove_tv(collection_id, tv_id).await?,
        _ => {
            return Err(ApiError::Validation(
                "exactly one of movie_id or tv_id is required".to_string(),
            ));
        }
    };

    Ok(Json(serde_json::json!({ "removed": removed })))
}

async fn delete_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    owned_collection(&state, user.id, collection_id).await?;
    state.db.collections().delete(collection_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/{id}",
            get(get_collection).post(add_item).delete(delete_collection),
        )
        .route("/collections/{id}/remove", axum::routing::post(remove_item))
}
