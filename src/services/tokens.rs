//! Download token issuance and redemption
//!
//! A token is the only thing the waiter trusts: the backend mints a GUID
//! bound to a user and a file (or a whole movie), the client hands the GUID
//! to the waiter, and the waiter calls back here to redeem it before
//! serving any bytes. Tokens are short-lived and capped per user.

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{CreateDownloadToken, Database, DownloadTokenRecord};
use crate::services::progress::ProgressService;

/// Payload returned to the waiter when it redeems a valid token
#[derive(Debug, Clone, Serialize)]
pub struct TokenPayload {
    pub guid: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub filename: String,
    pub path: String,
    pub is_movie: bool,
    pub mime_type: Option<String>,
    /// Resume offset in seconds, already rewound
    pub offset_secs: f64,
    /// Viewer preferences the waiter's player UI honors
    pub binge_mode: bool,
    pub site_theme: String,
    pub issued_at: chrono::DateTime<Utc>,
}

/// Download URL handed to clients for a freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub guid: Uuid,
    pub download_url: String,
    pub display_name: String,
}

#[derive(Clone)]
pub struct TokenService {
    db: Database,
    progress: ProgressService,
    waiter_public_url: String,
    holding_period_secs: i64,
    max_stored: i64,
}

impl TokenService {
    pub fn new(db: Database, progress: ProgressService, config: &Config) -> Self {
        Self {
            db,
            progress,
            waiter_public_url: config.waiter_public_url.clone(),
            holding_period_secs: config.token_holding_period_secs,
            max_stored: config.max_stored_tokens,
        }
    }

    /// Issue a token for a single media file
    pub async fn issue_for_file(&self, user_id: Uuid, media_file_id: Uuid) -> Result<IssuedToken> {
        let file = self
            .db
            .media_files()
            .get_by_id(media_file_id)
            .await?
            .ok_or_else(|| anyhow!("Media file not found"))?;

        let path = self
            .db
            .media_paths()
            .get_by_id(file.media_path_id)
            .await?
            .ok_or_else(|| anyhow!("Media path not found"))?;

        let record = self
            .db
            .download_tokens()
            .create_with_cap(
                CreateDownloadToken {
                    user_id,
                    media_file_id: Some(file.id),
                    movie_id: path.movie_id,
                    display_name: file.display_name.clone(),
                    filename: file.filename.clone(),
                    path: path.remote_path.clone(),
                    is_movie: file.is_movie,
                },
                self.max_stored,
            )
            .await?;

        // Surface the show on the user's "last watched" shortcut.
        if let Some(tv_id) = path.tv_id {
            self.db.user_settings().set_last_watched(user_id, tv_id).await?;
        }

        tracing::info!(
            user_id = %user_id,
            media_file_id = %media_file_id,
            guid = %record.id,
            "Issued download token"
        );

        Ok(self.issued(record))
    }

    /// Issue a token covering a whole movie directory
    pub async fn issue_for_movie(&self, user_id: Uuid, movie_id: Uuid) -> Result<IssuedToken> {
        let movie = self
            .db
            .movies()
            .get_by_id(movie_id)
            .await?
            .ok_or_else(|| anyhow!("Movie not found"))?;

        let paths = self.db.media_paths().list_by_movie(movie_id).await?;
        let path = paths
            .into_iter()
            .find(|p| !p.skip)
            .ok_or_else(|| anyhow!("Movie has no active path"))?;

        // A movie token points at the directory; single-file movies also
        // carry the filename so the waiter can serve it directly.
        let files = self.db.media_files().list_by_movie(movie_id).await?;
        let filename = match files.as_slice() {
            [only] => only.filename.clone(),
            _ => String::new(),
        };

        let record = self
            .db
            .download_tokens()
            .create_with_cap(
                CreateDownloadToken {
                    user_id,
                    media_file_id: None,
                    movie_id: Some(movie_id),
                    display_name: movie.name.clone(),
                    filename,
                    path: path.remote_path.clone(),
                    is_movie: true,
                },
                self.max_stored,
            )
            .await?;

        tracing::info!(
            user_id = %user_id,
            movie_id = %movie_id,
            guid = %record.id,
            "Issued movie download token"
        );

        Ok(self.issued(record))
    }

    /// Redeem a token GUID. Returns None for unknown or expired tokens;
    /// the waiter treats both identically.
    pub async fn redeem(&self, guid: Uuid) -> Result<Option<TokenPayload>> {
        let Some(record) = self.db.download_tokens().get_by_id(guid).await? else {
            return Ok(None);
        };

        if !record.is_valid(Utc::now(), self.holding_period_secs) {
            tracing::info!(guid = %guid, "Rejected expired download token");
            return Ok(None);
        }

        let user = self
            .db
            .users()
            .get_by_id(record.user_id)
            .await?
            .ok_or_else(|| anyhow!("Token owner no longer exists"))?;

        let settings = self.db.user_settings().get_or_create(record.user_id).await?;

        let offset_secs = match record.media_file_id {
            Some(file_id) => self.progress.resume_offset(record.user_id, file_id).await?,
            None => 0.0,
        };

        let mime_type = if record.filename.is_empty() {
            None
        } else {
            mime_guess::from_path(&record.filename)
                .first()
                .map(|m| m.essence_str().to_string())
        };

        Ok(Some(TokenPayload {
            guid: record.id,
            user_id: record.user_id,
            username: user.username,
            display_name: record.display_name,
            filename: record.filename,
            path: record.path,
            is_movie: record.is_movie,
            mime_type,
            offset_secs,
            binge_mode: settings.binge_mode,
            site_theme: settings.site_theme,
            issued_at: record.issued_at,
        }))
    }

    /// Delete tokens past the holding period; returns number deleted
    pub async fn expire_tokens(&self) -> Result<u64> {
        let deleted = self
            .db
            .download_tokens()
            .expire_older_than_secs(self.holding_period_secs)
            .await?;

        if deleted > 0 {
            tracing::info!(deleted = deleted, "Expired download tokens");
        }

        Ok(deleted)
    }

    fn issued(&self, record: DownloadTokenRecord) -> IssuedToken {
        let download_url = format!(
            "{}/download/{}",
            self.waiter_public_url.trim_end_matches('/'),
            record.id
        );

        IssuedToken {
            guid: record.id,
            download_url,
            display_name: record.display_name,
        }
    }
}
