//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for generating URLs)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// Database URL (PostgreSQL)
    pub database_url: String,

    /// JWT secret for token verification
    pub jwt_secret: String,

    /// TMDB API key
    pub tmdb_api_key: Option<String>,

    /// Base URL of the waiter streaming service
    pub waiter_url: String,

    /// Public URL the waiter exposes for token redemption links
    pub waiter_public_url: String,

    /// How long a download token stays valid, in seconds
    pub token_holding_period_secs: i64,

    /// Maximum download tokens stored per user before the oldest is evicted
    pub max_stored_tokens: i64,

    /// Seconds to rewind a resume offset when a token is redeemed
    pub progress_rewind_secs: f64,

    /// Days of inactivity before a video progress row is expired
    pub progress_retention_days: i64,

    /// Days of waiter status snapshots to retain
    pub waiter_status_retention_days: i64,

    /// SMTP relay host (unset disables outgoing email)
    pub smtp_host: Option<String>,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: Option<String>,

    /// SMTP password
    pub smtp_password: Option<String>,

    /// From address for outgoing email
    pub smtp_from: String,

    /// Base URL used to build password reset links
    pub password_reset_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is required")?;

        // In production this should be set explicitly; fall back to a
        // process-unique secret so dev sessions still work.
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            let mut hasher = DefaultHasher::new();
            std::time::SystemTime::now().hash(&mut hasher);
            format!("dev-secret-{}", hasher.finish())
        });

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            jwt_secret,

            tmdb_api_key: env::var("TMDB_API_KEY").ok(),

            waiter_url: env::var("WAITER_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),

            waiter_public_url: env::var("WAITER_PUBLIC_URL")
                .or_else(|_| env::var("WAITER_URL"))
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),

            token_holding_period_secs: env::var("TOKEN_HOLDING_PERIOD_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3 * 60 * 60),

            max_stored_tokens: env::var("MAX_STORED_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            progress_rewind_secs: env::var("PROGRESS_REWIND_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30.0),

            progress_retention_days: env::var("PROGRESS_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            waiter_status_retention_days: env::var("WAITER_STATUS_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),

            smtp_host: env::var("SMTP_HOST").ok().filter(|s| !s.trim().is_empty()),

            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),

            smtp_username: env::var("SMTP_USERNAME").ok(),

            smtp_password: env::var("SMTP_PASSWORD").ok(),

            smtp_from: env::var("SMTP_FROM").unwrap_or_else(|_| "mediaviewer@localhost".to_string()),

            password_reset_base_url: env::var("PASSWORD_RESET_BASE_URL").ok(),
        })
    }
}
