//! Repository for the `volunteers` table.

use chrono::Utc;
use grocery_core::types::TelegramId;

use crate::error::StoreResult;
use crate::models::volunteer::{UpsertVolunteer, Volunteer};
use crate::DbPool;

/// Column list for `volunteers` queries.
const COLUMNS: &str =
    "telegram_id, username, display_name, is_approved, is_coordinator, created_at, updated_at";

/// Provides volunteer registration and approval.
pub struct VolunteerRepo;

impl VolunteerRepo {
    /// Register a volunteer or refresh their names.
    ///
    /// An existing row keeps its names when the new ones are blank, and an
    /// upsert never revokes approval or coordinator status.
    pub async fn upsert(pool: &DbPool, input: &UpsertVolunteer) -> StoreResult<Volunteer> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO volunteers \
                 (telegram_id, username, display_name, is_approved, is_coordinator, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?) \
             ON CONFLICT (telegram_id) DO UPDATE SET \
                 username = COALESCE(NULLIF(excluded.username, ''), volunteers.username), \
                 display_name = COALESCE(NULLIF(excluded.display_name, ''), volunteers.display_name), \
                 is_approved = MAX(volunteers.is_approved, excluded.is_approved), \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        let volunteer = sqlx::query_as::<_, Volunteer>(&query)
            .bind(input.telegram_id)
            .bind(input.username.trim())
            .bind(input.display_name.trim())
            .bind(input.is_approved)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await?;
        Ok(volunteer)
    }

    /// Approve a volunteer, creating the row if they never messaged the bot.
    pub async fn approve(pool: &DbPool, telegram_id: TelegramId) -> StoreResult<Volunteer> {
        let volunteer = Self::upsert(
            pool,
            &UpsertVolunteer {
                telegram_id,
                is_approved: true,
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(volunteer_id = telegram_id, "Volunteer approved");
        Ok(volunteer)
    }

    /// Flag a user as coordinator (and approved). Used to seed the
    /// configured coordinators at startup; idempotent.
    pub async fn mark_coordinator(pool: &DbPool, telegram_id: TelegramId) -> StoreResult<Volunteer> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO volunteers \
                 (telegram_id, is_approved, is_coordinator, created_at, updated_at) \
             VALUES (?, 1, 1, ?, ?) \
             ON CONFLICT (telegram_id) DO UPDATE SET \
                 is_approved = 1, \
                 is_coordinator = 1, \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        let volunteer = sqlx::query_as::<_, Volunteer>(&query)
            .bind(telegram_id)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await?;
        Ok(volunteer)
    }

    /// Find a volunteer by Telegram id.
    pub async fn find_by_id(
        pool: &DbPool,
        telegram_id: TelegramId,
    ) -> StoreResult<Option<Volunteer>> {
        let query = format!("SELECT {COLUMNS} FROM volunteers WHERE telegram_id = ?");
        let volunteer = sqlx::query_as::<_, Volunteer>(&query)
            .bind(telegram_id)
            .fetch_optional(pool)
            .await?;
        Ok(volunteer)
    }

    /// Unknown users are not approved.
    pub async fn is_approved(pool: &DbPool, telegram_id: TelegramId) -> StoreResult<bool> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT is_approved FROM volunteers WHERE telegram_id = ?")
                .bind(telegram_id)
                .fetch_optional(pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }

    /// Unknown users are not coordinators.
    pub async fn is_coordinator(pool: &DbPool, telegram_id: TelegramId) -> StoreResult<bool> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT is_coordinator FROM volunteers WHERE telegram_id = ?")
                .bind(telegram_id)
                .fetch_optional(pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }
}
