//! Outbound notification sink.
//!
//! Delivery is best-effort: a failed send is logged and never propagated
//! to the lifecycle operation that triggered it.

use grocery_core::types::TelegramId;

use crate::telegram::TelegramApi;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to a user or chat. Never fails.
    async fn notify(&self, chat_id: TelegramId, text: &str);
}

#[async_trait::async_trait]
impl Notifier for TelegramApi {
    async fn notify(&self, chat_id: TelegramId, text: &str) {
        if let Err(e) = self.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "Failed to deliver message");
        }
    }
}

/// Send the same text to every recipient, one after another.
pub async fn notify_all<I>(notifier: &dyn Notifier, recipients: I, text: &str)
where
    I: IntoIterator<Item = TelegramId>,
{
    for chat_id in recipients {
        notifier.notify(chat_id, text).await;
    }
}
