use grocery_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A private delivery address. Deliberately not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct Address {
    pub request_id: DbId,
    pub address: String,
    pub created_at: Timestamp,
}
