//! Request lifecycle controller.
//!
//! Layers authorization and precondition checks over the store's atomic
//! transitions. Every check that can reject a caller runs before the
//! store is written; the store's conditional update then settles any race
//! between callers that all passed their checks.

use std::sync::Arc;

use grocery_core::budget::extract_budget;
use grocery_core::error::CoreError;
use grocery_core::roles::CoordinatorSet;
use grocery_core::status::{RequestStatus, ALL_STATUSES};
use grocery_core::types::{DbId, TelegramId};
use grocery_db::models::request::{CreateRequest, Request};
use grocery_db::models::volunteer::{UpsertVolunteer, Volunteer};
use grocery_db::repositories::{AddressRepo, RequestRepo, VolunteerRepo};
use grocery_db::DbPool;
use grocery_translate::Translator;

pub type LifecycleResult<T> = Result<T, CoreError>;

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: TelegramId,
    /// Display name recorded on claims.
    pub name: String,
}

impl Actor {
    pub fn new(id: TelegramId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A user joining the volunteer group.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: TelegramId,
    pub username: String,
    pub display_name: String,
}

pub struct Lifecycle {
    pool: DbPool,
    coordinators: CoordinatorSet,
    translator: Arc<dyn Translator>,
}

impl Lifecycle {
    pub fn new(pool: DbPool, coordinators: CoordinatorSet, translator: Arc<dyn Translator>) -> Self {
        Self {
            pool,
            coordinators,
            translator,
        }
    }

    pub fn coordinators(&self) -> &CoordinatorSet {
        &self.coordinators
    }

    /// Coordinator membership comes from configuration only.
    pub fn is_coordinator(&self, user_id: TelegramId) -> bool {
        self.coordinators.contains(user_id)
    }

    /// Record every configured coordinator as an approved coordinator.
    pub async fn seed_coordinators(&self) -> LifecycleResult<()> {
        for id in self.coordinators.iter() {
            VolunteerRepo::mark_coordinator(&self.pool, id).await?;
        }
        tracing::info!(count = self.coordinators.len(), "Coordinators seeded");
        Ok(())
    }

    // ---- request lifecycle ----

    /// Create a request in status `new`. Coordinator only.
    ///
    /// When no budget is given one is looked for in the text.
    pub async fn create_request(
        &self,
        actor: TelegramId,
        text: &str,
        budget: Option<String>,
        zone: Option<String>,
    ) -> LifecycleResult<Request> {
        self.require_coordinator(actor)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Request text must not be empty".into()));
        }

        let budget = budget
            .filter(|b| !b.trim().is_empty())
            .or_else(|| extract_budget(text));

        let request = RequestRepo::create(
            &self.pool,
            &CreateRequest {
                original_text: text.to_string(),
                budget,
                zone,
            },
        )
        .await?;

        tracing::info!(request_id = request.id, coordinator_id = actor, "Request created");
        Ok(request)
    }

    /// Translate a `new` request and post it. Coordinator only.
    ///
    /// The translation call happens before, and outside of, the store
    /// update. On failure the request stays `new` and can be retried.
    pub async fn publish(&self, actor: TelegramId, id: DbId) -> LifecycleResult<Request> {
        self.require_coordinator(actor)?;

        let request = RequestRepo::get(&self.pool, id).await?;
        if !request.status.can_transition_to(RequestStatus::Posted) {
            return Err(CoreError::NotAvailable {
                id,
                status: request.status,
            });
        }

        let translated = self
            .translator
            .translate(&request.original_text)
            .await
            .map_err(|e| {
                tracing::warn!(
                    request_id = id,
                    backend = self.translator.name(),
                    error = %e,
                    "Translation failed, request stays unposted"
                );
                CoreError::Translation(e.to_string())
            })?;

        let posted = RequestRepo::update_translation(&self.pool, id, &translated).await?;
        tracing::info!(request_id = id, "Request posted");
        Ok(posted)
    }

    /// Claim a posted request. The actor must be an approved volunteer or
    /// a coordinator; that is checked before any write.
    pub async fn claim(&self, actor: &Actor, id: DbId) -> LifecycleResult<Request> {
        if !self.can_volunteer(actor.id).await? {
            return Err(CoreError::NotApproved { user_id: actor.id });
        }
        Ok(RequestRepo::claim(&self.pool, id, actor.id, &actor.name).await?)
    }

    /// Mark a claimed request as being shopped for. Claimant only.
    pub async fn start_shopping(&self, actor: TelegramId, id: DbId) -> LifecycleResult<Request> {
        Ok(RequestRepo::start_shopping(&self.pool, id, actor).await?)
    }

    /// Mark a request delivered and purge its address. Claimant only.
    pub async fn complete(&self, actor: TelegramId, id: DbId) -> LifecycleResult<Request> {
        Ok(RequestRepo::complete(&self.pool, id, actor).await?)
    }

    /// A volunteer asks to drop a request. No transition happens here;
    /// coordinators decide manually. Returns the request so the caller can
    /// notify them.
    pub async fn request_cancellation(
        &self,
        actor: TelegramId,
        id: DbId,
    ) -> LifecycleResult<Request> {
        let request = RequestRepo::get(&self.pool, id).await?;
        tracing::info!(request_id = id, volunteer_id = actor, status = %request.status, "Cancellation requested");
        Ok(request)
    }

    // ---- coordinator operations ----

    pub async fn save_address(
        &self,
        actor: TelegramId,
        id: DbId,
        address: &str,
    ) -> LifecycleResult<()> {
        self.require_coordinator(actor)?;

        let address = address.trim();
        if address.is_empty() {
            return Err(CoreError::Validation("Address must not be empty".into()));
        }
        Ok(AddressRepo::save(&self.pool, id, address).await?)
    }

    pub async fn approve_volunteer(
        &self,
        actor: TelegramId,
        volunteer_id: TelegramId,
    ) -> LifecycleResult<Volunteer> {
        self.require_coordinator(actor)?;
        Ok(VolunteerRepo::approve(&self.pool, volunteer_id).await?)
    }

    /// Request count for every status, in lifecycle order, including
    /// zeros.
    pub async fn status_counts(
        &self,
        actor: TelegramId,
    ) -> LifecycleResult<Vec<(RequestStatus, i64)>> {
        self.require_coordinator(actor)?;

        let counts = RequestRepo::count_by_status(&self.pool).await?;
        Ok(ALL_STATUSES
            .into_iter()
            .map(|status| {
                let count = counts
                    .iter()
                    .find(|c| c.status == status)
                    .map_or(0, |c| c.count);
                (status, count)
            })
            .collect())
    }

    /// Register someone who joined the volunteer group. They start
    /// unapproved; an existing approval is kept.
    pub async fn register_member(&self, member: &NewMember) -> LifecycleResult<Volunteer> {
        let volunteer = VolunteerRepo::upsert(
            &self.pool,
            &UpsertVolunteer {
                telegram_id: member.id,
                username: member.username.clone(),
                display_name: member.display_name.clone(),
                is_approved: false,
            },
        )
        .await?;
        Ok(volunteer)
    }

    // ---- reads ----

    pub async fn request(&self, id: DbId) -> LifecycleResult<Request> {
        Ok(RequestRepo::get(&self.pool, id).await?)
    }

    /// The delivery address, if the actor may see it: coordinators always,
    /// volunteers only while they hold the claim.
    pub async fn address_for(
        &self,
        actor: TelegramId,
        request: &Request,
    ) -> LifecycleResult<Option<String>> {
        if !self.is_coordinator(actor) && !request.is_claimed_by(actor) {
            return Ok(None);
        }
        let address = AddressRepo::find(&self.pool, request.id).await?;
        Ok(address.map(|a| a.address))
    }

    pub async fn open_requests(&self) -> LifecycleResult<Vec<Request>> {
        Ok(RequestRepo::list_open(&self.pool).await?)
    }

    pub async fn volunteer_requests(&self, actor: TelegramId) -> LifecycleResult<Vec<Request>> {
        Ok(RequestRepo::list_for_volunteer(&self.pool, actor).await?)
    }

    // ---- private helpers ----

    fn require_coordinator(&self, user_id: TelegramId) -> LifecycleResult<()> {
        if self.is_coordinator(user_id) {
            Ok(())
        } else {
            Err(CoreError::NotCoordinator { user_id })
        }
    }

    async fn can_volunteer(&self, user_id: TelegramId) -> LifecycleResult<bool> {
        if self.is_coordinator(user_id) {
            return Ok(true);
        }
        Ok(VolunteerRepo::is_approved(&self.pool, user_id).await?)
    }
}
