//! Background job scheduling
//!
//! Recurring maintenance mirrors the management commands: anything the CLI
//! can run by hand, the scheduler runs on a timer.

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::services::{AuthService, MetadataService, ProgressService, TokenService, WaiterService};

/// Initialize and start the job scheduler
pub async fn start_scheduler(
    tokens: TokenService,
    progress: ProgressService,
    waiter: WaiterService,
    metadata: MetadataService,
    auth: AuthService,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Download token expiry - run hourly
    let token_svc = tokens.clone();
    let token_job = Job::new_async("0 0 * * * *", move |_uuid, _l| {
        let svc = token_svc.clone();
        Box::pin(async move {
            if let Err(e) = svc.expire_tokens().await {
                tracing::error!("Token expiry error: {}", e);
            }
        })
    })?;
    scheduler.add(token_job).await?;

    // Refresh token cleanup - run hourly, offset from token expiry
    let auth_svc = auth.clone();
    let refresh_job = Job::new_async("0 30 * * * *", move |_uuid, _l| {
        let svc = auth_svc.clone();
        Box::pin(async move {
            if let Err(e) = svc.cleanup_expired_tokens().await {
                tracing::error!("Refresh token cleanup error: {}", e);
            }
        })
    })?;
    scheduler.add(refresh_job).await?;

    // Stale video progress expiry - run daily at 4 AM
    let progress_svc = progress.clone();
    let progress_job = Job::new_async("0 0 4 * * *", move |_uuid, _l| {
        let svc = progress_svc.clone();
        Box::pin(async move {
            info!("Running video progress expiry");
            if let Err(e) = svc.expire_stale().await {
                tracing::error!("Video progress expiry error: {}", e);
            }
        })
    })?;
    scheduler.add(progress_job).await?;

    // Waiter health poll - run every 2 minutes
    let waiter_poll_svc = waiter.clone();
    let waiter_poll_job = Job::new_async("0 */2 * * * *", move |_uuid, _l| {
        let svc = waiter_poll_svc.clone();
        Box::pin(async move {
            if let Err(e) = svc.check_and_record().await {
                tracing::error!("Waiter health poll error: {}", e);
            }
        })
    })?;
    scheduler.add(waiter_poll_job).await?;

    // Waiter status trim - run daily at 3 AM
    let waiter_trim_svc = waiter.clone();
    let waiter_trim_job = Job::new_async("0 0 3 * * *", move |_uuid, _l| {
        let svc = waiter_trim_svc.clone();
        Box::pin(async move {
            info!("Running waiter status trim");
            if let Err(e) = svc.expire_stale().await {
                tracing::error!("Waiter status trim error: {}", e);
            }
        })
    })?;
    scheduler.add(waiter_trim_job).await?;

    // Poster population sweep - run daily at 5 AM
    let metadata_svc = metadata.clone();
    let poster_job = Job::new_async("0 0 5 * * *", move |_uuid, _l| {
        let svc = metadata_svc.clone();
        Box::pin(async move {
            info!("Running poster population sweep");
            if let Err(e) = svc.populate_missing().await {
                tracing::error!("Poster population error: {}", e);
            }
        })
    })?;
    scheduler.add(poster_job).await?;

    scheduler.start().await?;

    info!("Job scheduler started");
    Ok(scheduler)
}
