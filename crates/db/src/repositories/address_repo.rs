//! Repository for the `addresses` table.
//!
//! Addresses are kept apart from requests so no list query can leak one.
//! They are removed when the request is delivered (see
//! [`RequestRepo::complete`](super::RequestRepo::complete)) or purged.

use std::sync::LazyLock;

use chrono::Utc;
use grocery_core::status::ALL_STATUSES;
use grocery_core::types::DbId;

use crate::error::{StoreError, StoreResult};
use crate::models::address::Address;
use crate::DbPool;

/// Upsert that only applies while the request exists and is not in a
/// terminal status.
static SAVE_QUERY: LazyLock<String> = LazyLock::new(|| {
    let terminal = ALL_STATUSES
        .into_iter()
        .filter(|status| status.is_terminal())
        .map(|status| format!("'{}'", status.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO addresses (request_id, address, created_at) \
         SELECT ?, ?, ? \
         WHERE EXISTS ( \
             SELECT 1 FROM requests \
             WHERE id = ? AND status NOT IN ({terminal}) \
         ) \
         ON CONFLICT (request_id) DO UPDATE SET \
             address = excluded.address, \
             created_at = excluded.created_at"
    )
});

/// Provides access to private delivery addresses.
pub struct AddressRepo;

impl AddressRepo {
    /// Store (or replace) the address for a request.
    ///
    /// The insert only happens while the request exists and is not
    /// delivered or cancelled, checked in the same statement, so an address
    /// can never outlive a completion that ran concurrently.
    pub async fn save(pool: &DbPool, request_id: DbId, address: &str) -> StoreResult<()> {
        let result = sqlx::query(&SAVE_QUERY)
            .bind(request_id)
            .bind(address.trim())
            .bind(Utc::now())
            .bind(request_id)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::debug!(request_id, "Address stored");
            return Ok(());
        }

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM requests WHERE id = ?")
            .bind(request_id)
            .fetch_optional(pool)
            .await?;
        match status {
            None => Err(StoreError::NotFound {
                entity: "request",
                id: request_id,
            }),
            Some(status) => Err(StoreError::NotAvailable {
                id: request_id,
                status: status
                    .parse()
                    .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            }),
        }
    }

    /// Point lookup that fails with [`StoreError::NotFound`].
    pub async fn get(pool: &DbPool, request_id: DbId) -> StoreResult<Address> {
        Self::find(pool, request_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "address",
                id: request_id,
            })
    }

    /// Find the address for a request, if one is stored.
    pub async fn find(pool: &DbPool, request_id: DbId) -> StoreResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            "SELECT request_id, address, created_at FROM addresses WHERE request_id = ?",
        )
        .bind(request_id)
        .fetch_optional(pool)
        .await?;
        Ok(address)
    }
}
