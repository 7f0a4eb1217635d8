//! Minimal Telegram Bot API client and the update types the bot reads.

pub mod api;
pub mod types;

pub use api::{TelegramApi, TelegramError};
pub use types::{Chat, Message, Update, User};
