//! Repository for the `requests` table.
//!
//! Every status change is an `UPDATE ... WHERE id = ? AND status = ?`
//! (plus an ownership predicate where relevant). A statement that matches
//! no row is classified afterwards with a point lookup; it is never
//! retried and never turned into an unconditional write.

use chrono::Utc;
use grocery_core::status::RequestStatus;
use grocery_core::types::{DbId, TelegramId, Timestamp};
use sqlx::sqlite::SqliteExecutor;
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};
use crate::models::request::{CreateRequest, Request, StatusCount};
use crate::DbPool;

/// Column list for `requests` queries.
const COLUMNS: &str = "\
    id, original_text, translated_text, budget, zone, status, \
    claimed_by, claimed_by_name, created_at, updated_at, delivered_at";

/// Retention predicate shared by the purge statements. Binds the cutoff
/// twice.
const PURGEABLE: &str = "\
    (status = 'delivered' AND delivered_at < ?) \
    OR (status = 'cancelled' AND updated_at < ?)";

/// Status and claimant of one row, used to explain a zero-row update.
#[derive(Debug, FromRow)]
struct ClaimState {
    #[sqlx(try_from = "String")]
    status: RequestStatus,
    claimed_by: Option<TelegramId>,
}

/// Provides the request lifecycle operations.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request in status `new`.
    ///
    /// Blank budget and zone strings are stored as `NULL`.
    pub async fn create(pool: &DbPool, input: &CreateRequest) -> StoreResult<Request> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO requests (original_text, budget, zone, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&query)
            .bind(&input.original_text)
            .bind(non_blank(input.budget.as_deref()))
            .bind(non_blank(input.zone.as_deref()))
            .bind(RequestStatus::New.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await?;

        tracing::debug!(request_id = request.id, "Request created");
        Ok(request)
    }

    /// Store the translated shopping list and advance `new -> posted`.
    ///
    /// Only applies to requests still in `new`, so a late or repeated
    /// translation can never pull a claimed request back to `posted`.
    pub async fn update_translation(
        pool: &DbPool,
        id: DbId,
        translated_text: &str,
    ) -> StoreResult<Request> {
        let query = format!(
            "UPDATE requests \
             SET translated_text = ?, status = ?, updated_at = ? \
             WHERE id = ? AND status = ? \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Request>(&query)
            .bind(translated_text)
            .bind(RequestStatus::Posted.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(RequestStatus::New.as_str())
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(request) => Ok(request),
            None => Err(Self::explain_unavailable(pool, id).await),
        }
    }

    /// Claim a posted request for a volunteer.
    ///
    /// A single compare-and-swap on `status = 'posted'`: when two
    /// volunteers race, exactly one statement matches the row and the
    /// other observes zero rows and gets [`StoreError::NotAvailable`].
    pub async fn claim(
        pool: &DbPool,
        id: DbId,
        volunteer_id: TelegramId,
        volunteer_name: &str,
    ) -> StoreResult<Request> {
        let query = format!(
            "UPDATE requests \
             SET status = ?, claimed_by = ?, claimed_by_name = ?, updated_at = ? \
             WHERE id = ? AND status = ? \
             RETURNING {COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, Request>(&query)
            .bind(RequestStatus::Claimed.as_str())
            .bind(volunteer_id)
            .bind(volunteer_name)
            .bind(Utc::now())
            .bind(id)
            .bind(RequestStatus::Posted.as_str())
            .fetch_optional(pool)
            .await?;

        match claimed {
            Some(request) => {
                tracing::info!(request_id = id, volunteer_id, "Request claimed");
                Ok(request)
            }
            None => Err(Self::explain_unavailable(pool, id).await),
        }
    }

    /// Move a claimed request to `shopping`. Only the claimant may do so.
    pub async fn start_shopping(
        pool: &DbPool,
        id: DbId,
        volunteer_id: TelegramId,
    ) -> StoreResult<Request> {
        let query = format!(
            "UPDATE requests \
             SET status = ?, updated_at = ? \
             WHERE id = ? AND status = ? AND claimed_by = ? \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Request>(&query)
            .bind(RequestStatus::Shopping.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(RequestStatus::Claimed.as_str())
            .bind(volunteer_id)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(request) => Ok(request),
            None => Err(Self::explain_not_owned(pool, id, volunteer_id).await),
        }
    }

    /// Mark a request delivered and delete its address, atomically.
    ///
    /// The update is conditioned on the caller holding an active claim.
    /// The address row is removed in the same transaction; if either
    /// statement fails nothing is committed.
    pub async fn complete(
        pool: &DbPool,
        id: DbId,
        volunteer_id: TelegramId,
    ) -> StoreResult<Request> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE requests \
             SET status = ?, delivered_at = ?, updated_at = ? \
             WHERE id = ? AND claimed_by = ? AND status IN (?, ?) \
             RETURNING {COLUMNS}"
        );
        let delivered = sqlx::query_as::<_, Request>(&query)
            .bind(RequestStatus::Delivered.as_str())
            .bind(now)
            .bind(now)
            .bind(id)
            .bind(volunteer_id)
            .bind(RequestStatus::Claimed.as_str())
            .bind(RequestStatus::Shopping.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = delivered else {
            // Dropping `tx` rolls back; nothing was written.
            return Err(Self::explain_not_owned(&mut *tx, id, volunteer_id).await);
        };

        sqlx::query("DELETE FROM addresses WHERE request_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(request_id = id, volunteer_id, "Request delivered, address purged");
        Ok(request)
    }

    /// Point lookup that fails with [`StoreError::NotFound`].
    pub async fn get(pool: &DbPool, id: DbId) -> StoreResult<Request> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "request",
                id,
            })
    }

    /// Find a request by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> StoreResult<Option<Request>> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = ?");
        let request = sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(request)
    }

    /// All posted requests, oldest first so long-waiting families are
    /// served first.
    pub async fn list_open(pool: &DbPool) -> StoreResult<Vec<Request>> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE status = ? \
             ORDER BY created_at ASC, id ASC"
        );
        let requests = sqlx::query_as::<_, Request>(&query)
            .bind(RequestStatus::Posted.as_str())
            .fetch_all(pool)
            .await?;
        Ok(requests)
    }

    /// Requests a volunteer currently holds (claimed or shopping), newest
    /// first.
    pub async fn list_for_volunteer(
        pool: &DbPool,
        volunteer_id: TelegramId,
    ) -> StoreResult<Vec<Request>> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE claimed_by = ? AND status IN (?, ?) \
             ORDER BY created_at DESC, id DESC"
        );
        let requests = sqlx::query_as::<_, Request>(&query)
            .bind(volunteer_id)
            .bind(RequestStatus::Claimed.as_str())
            .bind(RequestStatus::Shopping.as_str())
            .fetch_all(pool)
            .await?;
        Ok(requests)
    }

    /// Number of requests per status. Statuses with no rows are omitted.
    pub async fn count_by_status(pool: &DbPool) -> StoreResult<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM requests GROUP BY status",
        )
        .fetch_all(pool)
        .await?;
        Ok(counts)
    }

    /// Delete delivered (and cancelled) requests older than `older_than`.
    pub async fn purge_old(pool: &DbPool, older_than: chrono::Duration) -> StoreResult<u64> {
        Self::purge_before(pool, Utc::now() - older_than).await
    }

    /// Delete delivered requests whose `delivered_at`, and cancelled
    /// requests whose `updated_at`, predate `cutoff`, together with any
    /// address rows they still own. Returns the number of requests
    /// removed; zero is a normal result.
    pub async fn purge_before(pool: &DbPool, cutoff: Timestamp) -> StoreResult<u64> {
        let mut tx = pool.begin().await?;

        let addresses = format!(
            "DELETE FROM addresses WHERE request_id IN \
             (SELECT id FROM requests WHERE {PURGEABLE})"
        );
        sqlx::query(&addresses)
            .bind(cutoff)
            .bind(cutoff)
            .execute(&mut *tx)
            .await?;

        let requests = format!("DELETE FROM requests WHERE {PURGEABLE}");
        let result = sqlx::query(&requests)
            .bind(cutoff)
            .bind(cutoff)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    // ---- private helpers ----

    async fn claim_state<'e, E>(executor: E, id: DbId) -> StoreResult<Option<ClaimState>>
    where
        E: SqliteExecutor<'e>,
    {
        let state = sqlx::query_as::<_, ClaimState>(
            "SELECT status, claimed_by FROM requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(state)
    }

    /// Explain why a status-conditioned update matched nothing.
    async fn explain_unavailable<'e, E>(executor: E, id: DbId) -> StoreError
    where
        E: SqliteExecutor<'e>,
    {
        match Self::claim_state(executor, id).await {
            Ok(Some(state)) => StoreError::NotAvailable {
                id,
                status: state.status,
            },
            Ok(None) => StoreError::NotFound {
                entity: "request",
                id,
            },
            Err(e) => e,
        }
    }

    /// Explain why an ownership-conditioned update matched nothing. The
    /// ownership check takes precedence over the status check.
    async fn explain_not_owned<'e, E>(executor: E, id: DbId, volunteer_id: TelegramId) -> StoreError
    where
        E: SqliteExecutor<'e>,
    {
        match Self::claim_state(executor, id).await {
            Ok(Some(state)) if state.claimed_by != Some(volunteer_id) => {
                StoreError::NotOwner { id }
            }
            Ok(Some(state)) => StoreError::NotAvailable {
                id,
                status: state.status,
            },
            Ok(None) => StoreError::NotFound {
                entity: "request",
                id,
            },
            Err(e) => e,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
