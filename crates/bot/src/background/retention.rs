//! Periodic purge of delivered and cancelled requests.
//!
//! Runs on a fixed interval using `tokio::time::interval`, independent of
//! request traffic. Each sweep is a single bulk delete that also removes
//! any address rows the purged requests still own.

use std::time::Duration;

use grocery_db::repositories::RequestRepo;
use grocery_db::{DbPool, StoreResult};
use tokio_util::sync::CancellationToken;

/// Retention window and sweep cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionSettings {
    /// How long a finished request is kept.
    pub retention: chrono::Duration,
    /// How often the sweep runs.
    pub interval: Duration,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::hours(48),
            interval: Duration::from_secs(3600),
        }
    }
}

/// Purge once. Deleting nothing is a success.
pub async fn sweep_once(pool: &DbPool, retention: chrono::Duration) -> StoreResult<u64> {
    RequestRepo::purge_old(pool, retention).await
}

/// Run the retention loop until `cancel` is triggered.
///
/// The first sweep happens immediately. A failed sweep is logged and the
/// schedule continues.
pub async fn run(pool: DbPool, settings: RetentionSettings, cancel: CancellationToken) {
    tracing::info!(
        retention_hours = settings.retention.num_hours(),
        interval_secs = settings.interval.as_secs(),
        "Request retention job started"
    );

    let mut interval = tokio::time::interval(settings.interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Request retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, settings.retention).await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "Request retention: purged old requests");
                    }
                    Ok(_) => {
                        tracing::debug!("Request retention: nothing to purge");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Request retention: sweep failed");
                    }
                }
            }
        }
    }
}
