use grocery_core::types::{TelegramId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `volunteers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Volunteer {
    pub telegram_id: TelegramId,
    pub username: String,
    pub display_name: String,
    pub is_approved: bool,
    pub is_coordinator: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for registering (or refreshing) a volunteer.
#[derive(Debug, Clone, Default)]
pub struct UpsertVolunteer {
    pub telegram_id: TelegramId,
    pub username: String,
    pub display_name: String,
    pub is_approved: bool,
}
