//! Waiter health coordination
//!
//! The waiter exposes a status endpoint returning `{"status": true}` when
//! it can serve files. Every poll outcome is recorded as a snapshot row;
//! anything other than a healthy response counts as a failure.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::db::{Database, WaiterStatusRecord};
use crate::services::rate_limiter::RateLimitedClient;

#[derive(Debug, Deserialize)]
struct WaiterStatusBody {
    status: bool,
}

#[derive(Clone)]
pub struct WaiterService {
    db: Database,
    client: Arc<RateLimitedClient>,
    status_url: String,
    retention_days: i64,
}

impl WaiterService {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            client: Arc::new(RateLimitedClient::for_waiter()),
            status_url: format!("{}/status", config.waiter_url.trim_end_matches('/')),
            retention_days: config.waiter_status_retention_days,
        }
    }

    /// Poll the waiter once and record the outcome
    pub async fn check_and_record(&self) -> Result<WaiterStatusRecord> {
        let failed = !self.poll().await;
        self.db.waiter_status().record(failed).await
    }

    /// True when the waiter answered healthy
    async fn poll(&self) -> bool {
        let response = match self.client.get(&self.status_url).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Waiter status request failed");
                return false;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Waiter returned unhealthy status code");
            return false;
        }

        match response.json::<WaiterStatusBody>().await {
            Ok(body) => body.status,
            Err(e) => {
                warn!(error = %e, "Waiter status body did not parse");
                false
            }
        }
    }

    /// Most recent snapshot
    pub async fn latest(&self) -> Result<Option<WaiterStatusRecord>> {
        self.db.waiter_status().latest().await
    }

    /// Trim old snapshots; returns number deleted
    pub async fn expire_stale(&self) -> Result<u64> {
        let deleted = self
            .db
            .waiter_status()
            .expire_older_than_days(self.retention_days)
            .await?;

        if deleted > 0 {
            tracing::info!(deleted = deleted, "Expired waiter status snapshots");
        }

        Ok(deleted)
    }
}
