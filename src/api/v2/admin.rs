//! V2 staff-only administration endpoints
//!
//! There is no open registration: staff create accounts here. Scraper
//! definitions and on-demand poster population live here too.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StaffUser;
use crate::db::{CreateScraper, ScraperRecord, UserRecord};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserItem {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<UserRecord> for UserItem {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            is_staff: r.is_staff,
            is_active: r.is_active,
            last_login: r.last_login,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Serialize)]
pub struct ScraperItem {
    pub id: Uuid,
    pub name: String,
    pub name_regex: String,
    pub season_regex: String,
    pub episode_regex: String,
    pub priority: i32,
}

impl From<ScraperRecord> for ScraperItem {
    fn from(r: ScraperRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            name_regex: r.name_regex,
            season_regex: r.season_regex,
            episode_regex: r.episode_regex,
            priority: r.priority,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateScraperBody {
    pub name: String,
    pub name_regex: String,
    pub season_regex: String,
    pub episode_regex: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Serialize)]
pub struct GeneratePostersResponse {
    pub movies: usize,
    pub tv_shows: usize,
    pub episodes: usize,
    pub failures: usize,
}

async fn list_users(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> ApiResult<Json<Vec<UserItem>>> {
    let records = state.db.users().list().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn create_user(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<Json<UserItem>> {
    if body.username.trim().is_empty() {
        return Err(ApiError::Validation("username is required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let record = state
        .auth
        .create_user(
            body.username.trim(),
            body.email.as_deref(),
            &body.password,
            body.is_staff,
        )
        .await
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    Ok(Json(record.into()))
}

async fn list_scrapers(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> ApiResult<Json<Vec<ScraperItem>>> {
    let records = state.db.scrapers().list_ordered().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn create_scraper(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Json(body): Json<CreateScraperBody>,
) -> ApiResult<Json<ScraperItem>> {
    // Reject patterns the scrape pass would have to skip.
    for (label, pattern) in [
        ("name_regex", &body.name_regex),
        ("season_regex", &body.season_regex),
        ("episode_regex", &body.episode_regex),
    ] {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(ApiError::Validation(format!("{} is invalid: {}", label, e)));
        }
    }

    let record = state
        .db
        .scrapers()
        .create(CreateScraper {
            name: body.name,
            name_regex: body.name_regex,
            season_regex: body.season_regex,
            episode_regex: body.episode_regex,
            priority: body.priority,
        })
        .await?;

    Ok(Json(record.into()))
}

async fn delete_scraper(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(scraper_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.scrapers().delete(scraper_id).await? {
        return Err(ApiError::NotFound("scraper"));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Run the poster population sweep on demand
async fn generate_posters(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
) -> ApiResult<Json<GeneratePostersResponse>> {
    let summary = state.metadata.populate_missing().await?;

    Ok(Json(GeneratePostersResponse {
        movies: summary.movies,
        tv_shows: summary.tv_shows,
        episodes: summary.episodes,
        failures: summary.failures,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/scrapers", get(list_scrapers).post(create_scraper))
        .route("/admin/scrapers/{id}", axum::routing::delete(delete_scraper))
        .route("/admin/posters/generate", post(generate_posters))
}
