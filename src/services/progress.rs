//! Video progress tracking with rewind-on-resume
//!
//! Offsets are recorded against a hashed filename so different rips of the
//! same file do not collide across users' players. Resuming rewinds the
//! stored offset by a small window so playback restarts slightly before
//! the last recorded position.

use anyhow::Result;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{Database, UpsertComment, UpsertVideoProgress, VideoProgressRecord};

/// Seconds from the end of a file inside which playback counts as finished
const FINISHED_WINDOW_SECS: f64 = 60.0;

#[derive(Clone)]
pub struct ProgressService {
    db: Database,
    rewind_secs: f64,
    retention_days: i64,
}

impl ProgressService {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            rewind_secs: config.progress_rewind_secs,
            retention_days: config.progress_retention_days,
        }
    }

    /// Record an offset for a (user, hashed filename) pair.
    ///
    /// When the client also reports the file duration and the offset has
    /// entered the finished window, the file is marked viewed and the
    /// progress row destroyed instead: watched implies no resume point.
    pub async fn record(
        &self,
        user_id: Uuid,
        hashed_filename: &str,
        offset_secs: f64,
        media_file_id: Option<Uuid>,
        movie_id: Option<Uuid>,
        duration_secs: Option<f64>,
    ) -> Result<Option<VideoProgressRecord>> {
        let offset_secs = offset_secs.max(0.0);

        if let Some(duration) = duration_secs
            && duration > 0.0
            && offset_secs >= (duration - FINISHED_WINDOW_SECS).max(0.0)
        {
            self.finish(user_id, hashed_filename, media_file_id).await?;
            return Ok(None);
        }

        let record = self
            .db
            .video_progress()
            .upsert(UpsertVideoProgress {
                user_id,
                media_file_id,
                movie_id,
                hashed_filename: hashed_filename.to_string(),
                offset_secs,
            })
            .await?;

        Ok(Some(record))
    }

    /// Fetch the stored progress row, untouched
    pub async fn get(
        &self,
        user_id: Uuid,
        hashed_filename: &str,
    ) -> Result<Option<VideoProgressRecord>> {
        self.db.video_progress().get(user_id, hashed_filename).await
    }

    /// Resume offset for a media file, rewound and floored at zero
    pub async fn resume_offset(&self, user_id: Uuid, media_file_id: Uuid) -> Result<f64> {
        let record = self
            .db
            .video_progress()
            .get_for_file(user_id, media_file_id)
            .await?;

        Ok(record
            .map(|r| rewind(r.offset_secs, self.rewind_secs))
            .unwrap_or(0.0))
    }

    /// Finish playback: destroy the progress row and mark the file viewed
    pub async fn finish(
        &self,
        user_id: Uuid,
        hashed_filename: &str,
        media_file_id: Option<Uuid>,
    ) -> Result<()> {
        let stored = self.db.video_progress().get(user_id, hashed_filename).await?;
        self.db.video_progress().delete(user_id, hashed_filename).await?;

        // Prefer the explicit link, fall back to whatever the row recorded.
        let file_id = media_file_id.or_else(|| stored.as_ref().and_then(|r| r.media_file_id));

        if let Some(file_id) = file_id {
            self.db
                .comments()
                .upsert(UpsertComment {
                    user_id,
                    media_file_id: file_id,
                    viewed: true,
                })
                .await?;
        }

        Ok(())
    }

    /// Delete rows untouched for longer than the retention window
    pub async fn expire_stale(&self) -> Result<u64> {
        let deleted = self
            .db
            .video_progress()
            .expire_older_than_days(self.retention_days)
            .await?;

        if deleted > 0 {
            tracing::info!(deleted = deleted, "Expired stale video progress");
        }

        Ok(deleted)
    }
}

/// Rewind an offset by the configured window, floored at zero
pub fn rewind(offset_secs: f64, rewind_secs: f64) -> f64 {
    (offset_secs - rewind_secs).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewind_subtracts_window() {
        assert_eq!(rewind(100.0, 30.0), 70.0);
    }

    #[test]
    fn test_rewind_floors_at_zero() {
        assert_eq!(rewind(10.0, 30.0), 0.0);
        assert_eq!(rewind(0.0, 30.0), 0.0);
    }

    #[test]
    fn test_rewind_zero_window_is_identity() {
        assert_eq!(rewind(42.5, 0.0), 42.5);
    }
}
