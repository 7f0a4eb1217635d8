//! Long-polling update loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;
use crate::telegram::TelegramApi;

/// Pause after a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Poll for updates until `cancel` is triggered. Each update is handled in
/// its own task so a slow translation never blocks a claim.
pub async fn run(
    api: Arc<TelegramApi>,
    dispatcher: Arc<Dispatcher>,
    poll_timeout: Duration,
    cancel: CancellationToken,
) {
    if let Err(e) = api.delete_webhook().await {
        tracing::warn!(error = %e, "Could not remove webhook");
    }
    tracing::info!(timeout_secs = poll_timeout.as_secs(), "Polling for updates");

    let mut offset: i64 = 0;
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = api.get_updates(offset, poll_timeout) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let dispatcher = Arc::clone(&dispatcher);
                    tokio::spawn(async move {
                        dispatcher.handle_update(update).await;
                    });
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    tracing::info!("Polling stopped");
}
