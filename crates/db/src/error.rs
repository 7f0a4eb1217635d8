use grocery_core::error::CoreError;
use grocery_core::status::RequestStatus;
use grocery_core::types::DbId;

/// Outcome of a store operation that did not apply.
///
/// `NotAvailable` and `NotOwner` come from a conditional write that
/// matched zero rows. They are normal outcomes (someone else won the
/// race, or the request moved on), not faults.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("request {id} is {status}")]
    NotAvailable { id: DbId, status: RequestStatus },

    #[error("request {id} is not claimed by this volunteer")]
    NotOwner { id: DbId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::NotAvailable { id, status } => CoreError::NotAvailable { id, status },
            StoreError::NotOwner { id } => CoreError::NotOwner { id },
            StoreError::Database(e) => CoreError::Storage(e.to_string()),
        }
    }
}
