//! Grocery request rows.

use grocery_core::status::RequestStatus;
use grocery_core::types::{DbId, TelegramId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    /// Source-language text exactly as submitted. Never updated.
    pub original_text: String,
    /// Public shopping list; `None` until translation succeeds.
    pub translated_text: Option<String>,
    pub budget: Option<String>,
    pub zone: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub claimed_by: Option<TelegramId>,
    pub claimed_by_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
}

impl Request {
    /// Whether `volunteer_id` currently holds the claim on this request.
    pub fn is_claimed_by(&self, volunteer_id: TelegramId) -> bool {
        self.status.is_active_claim() && self.claimed_by == Some(volunteer_id)
    }
}

/// Input for inserting a new request.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub original_text: String,
    pub budget: Option<String>,
    pub zone: Option<String>,
}

/// Number of requests currently in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub count: i64,
}
