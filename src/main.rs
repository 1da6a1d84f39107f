//! MediaViewer Backend - media catalog and streaming coordinator
//!
//! Maintains the movie/TV catalog, per-user watch state, download tokens
//! redeemed by the external waiter streaming service, and user requests.
//! REST APIs are served under /api (legacy, Basic auth) and /api/v2 (JWT).

mod api;
mod cli;
mod config;
mod db;
mod error;
mod jobs;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{CliOptions, Command};
use crate::config::Config;
use crate::db::Database;
use crate::services::{
    AuthConfig, AuthService, EmailService, MetadataService, ProgressService, TmdbClient,
    TokenService, WaiterService,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    pub tokens: TokenService,
    pub progress: ProgressService,
    pub metadata: MetadataService,
    pub waiter: WaiterService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = CliOptions::from_args();

    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediaviewer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting MediaViewer Backend");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    tracing::info!("Database connected and migrated");

    // Shared services
    let email = EmailService::from_config(&config)?;
    let auth = AuthService::new(
        db.clone(),
        email,
        AuthConfig::new(config.jwt_secret.clone()),
    );
    let progress = ProgressService::new(db.clone(), &config);
    let tokens = TokenService::new(db.clone(), progress.clone(), &config);
    let tmdb = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone().unwrap_or_default(),
    ));
    let metadata = MetadataService::new(db.clone(), tmdb);
    let waiter = WaiterService::new(db.clone(), &config);

    // Management commands run once and exit.
    match options.command {
        Command::Serve => {}
        Command::ExpireTokens => {
            let deleted = tokens.expire_tokens().await?;
            println!("Deleted {} expired download tokens", deleted);
            return Ok(());
        }
        Command::ExpireVideoProgress => {
            let deleted = progress.expire_stale().await?;
            println!("Deleted {} stale video progress rows", deleted);
            return Ok(());
        }
        Command::ExpireWaiterStatus => {
            let deleted = waiter.expire_stale().await?;
            println!("Deleted {} old waiter status snapshots", deleted);
            return Ok(());
        }
        Command::GeneratePosters => {
            let summary = metadata.populate_missing().await?;
            println!(
                "Populated posters: {} movies, {} shows, {} episodes ({} failures)",
                summary.movies, summary.tv_shows, summary.episodes, summary.failures
            );
            return Ok(());
        }
        Command::SeedData => {
            db::seed::seed_data(&db, &auth).await?;
            println!("Seed data inserted");
            return Ok(());
        }
        Command::Alfred => {
            let token_count = tokens.expire_tokens().await?;
            let progress_count = progress.expire_stale().await?;
            let status_count = waiter.expire_stale().await?;
            auth.cleanup_expired_tokens().await?;
            let status = waiter.check_and_record().await?;
            println!(
                "Maintenance sweep: {} tokens, {} progress rows, {} status rows; waiter healthy: {}",
                token_count, progress_count, status_count, !status.failed_status
            );
            return Ok(());
        }
    }

    // Start job scheduler
    let _scheduler = jobs::start_scheduler(
        tokens.clone(),
        progress.clone(),
        waiter.clone(),
        metadata.clone(),
        auth.clone(),
    )
    .await?;

    if !db.users().has_staff().await? {
        tracing::warn!("No staff user exists; run 'mediaviewer seed-data' to create one");
    }

    let state = AppState {
        db,
        auth,
        tokens,
        progress,
        metadata,
        waiter,
    };

    let app = Router::new()
        // Health endpoints (no auth required)
        .merge(api::health::router())
        // /api/v2 (JWT bearer auth) alongside the legacy /api resources (Basic auth)
        .nest(
            "/api",
            Router::new()
                .nest("/v2", api::v2::router())
                .merge(api::legacy::router()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
