//! Database connection and operations
//!
//! Re-exports are provided for convenience, even if not all are used within the crate.

#![allow(unused_imports)]

pub mod collections;
pub mod comments;
pub mod download_tokens;
pub mod media_files;
pub mod media_paths;
pub mod messages;
pub mod movies;
pub mod posters;
pub mod requests;
pub mod scrapers;
pub mod seed;
pub mod tv_shows;
pub mod user_settings;
pub mod users;
pub mod video_progress;
pub mod waiter_status;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use collections::{CollectionRecord, CollectionRepository, CreateCollection};
pub use comments::{CommentRecord, CommentRepository, UpsertComment};
pub use download_tokens::{CreateDownloadToken, DownloadTokenRecord, DownloadTokenRepository};
pub use media_files::{
    CreateMediaFile, MediaFileRecord, MediaFileRepository, UpdateMediaFile,
};
pub use media_paths::{CreateMediaPath, MediaPathRecord, MediaPathRepository, PathKind};
pub use messages::{CreateMessage, MessageRecord, MessageRepository};
pub use movies::{CreateMovie, MovieRecord, MovieRepository, UpdateMovie};
pub use posters::{
    NamedRecord, PosterOwner, PosterRecord, PosterRepository, UpsertPoster,
};
pub use requests::{
    CreateRequest, RequestRecord, RequestRepository, RequestVoteRecord, RequestWithVotes,
};
pub use scrapers::{CreateScraper, ScraperRecord, ScraperRepository};
pub use tv_shows::{CreateTvShow, TvShowRecord, TvShowRepository, UpdateTvShow};
pub use user_settings::{UpdateUserSettings, UserSettingsRecord, UserSettingsRepository};
pub use users::{
    CreateUser, PasswordResetTokenRecord, RefreshTokenRecord, UpdateUser, UserRecord,
    UsersRepository,
};
pub use video_progress::{
    UpsertVideoProgress, VideoProgressRecord, VideoProgressRepository,
};
pub use waiter_status::{WaiterStatusRecord, WaiterStatusRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the maximum connection pool size from environment or default
    fn get_max_connections() -> u32 {
        std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10)
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str) -> Result<Self> {
        let max_connections = Self::get_max_connections();
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Get a media paths repository
    pub fn media_paths(&self) -> MediaPathRepository {
        MediaPathRepository::new(self.pool.clone())
    }

    /// Get a movies repository
    pub fn movies(&self) -> MovieRepository {
        MovieRepository::new(self.pool.clone())
    }

    /// Get a TV show repository
    pub fn tv_shows(&self) -> TvShowRepository {
        TvShowRepository::new(self.pool.clone())
    }

    /// Get a media files repository
    pub fn media_files(&self) -> MediaFileRepository {
        MediaFileRepository::new(self.pool.clone())
    }

    /// Get a posters repository
    pub fn posters(&self) -> PosterRepository {
        PosterRepository::new(self.pool.clone())
    }

    /// Get a comments repository
    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.pool.clone())
    }

    /// Get a video progress repository
    pub fn video_progress(&self) -> VideoProgressRepository {
        VideoProgressRepository::new(self.pool.clone())
    }

    /// Get a download tokens repository
    pub fn download_tokens(&self) -> DownloadTokenRepository {
        DownloadTokenRepository::new(self.pool.clone())
    }

    /// Get a requests repository
    pub fn requests(&self) -> RequestRepository {
        RequestRepository::new(self.pool.clone())
    }

    /// Get a user settings repository
    pub fn user_settings(&self) -> UserSettingsRepository {
        UserSettingsRepository::new(self.pool.clone())
    }

    /// Get a messages repository
    pub fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.pool.clone())
    }

    /// Get a collections repository
    pub fn collections(&self) -> CollectionRepository {
        CollectionRepository::new(self.pool.clone())
    }

    /// Get a waiter status repository
    pub fn waiter_status(&self) -> WaiterStatusRepository {
        WaiterStatusRepository::new(self.pool.clone())
    }

    /// Get a scrapers repository
    pub fn scrapers(&self) -> ScraperRepository {
        ScraperRepository::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
