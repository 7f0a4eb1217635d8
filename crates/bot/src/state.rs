use std::sync::Arc;

use crate::dispatch::Dispatcher;

/// Shared state for the webhook server, available via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: grocery_db::DbPool,
    pub dispatcher: Arc<Dispatcher>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`; `None` disables the check.
    pub webhook_secret: Option<Arc<str>>,
}
