use crate::status::RequestStatus;
use crate::types::{DbId, TelegramId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Request {id} is not available (status: {status})")]
    NotAvailable { id: DbId, status: RequestStatus },

    #[error("User {user_id} is not an approved volunteer")]
    NotApproved { user_id: TelegramId },

    #[error("User {user_id} is not a coordinator")]
    NotCoordinator { user_id: TelegramId },

    #[error("Request {id} is claimed by another volunteer")]
    NotOwner { id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Translation failed: {0}")]
    Translation(String),
}

impl CoreError {
    /// Infrastructure failures are reported generically to end users and
    /// are the only kinds worth a manual retry.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Translation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_and_translation_are_infrastructure() {
        assert!(CoreError::Storage("disk".into()).is_infrastructure());
        assert!(CoreError::Translation("timeout".into()).is_infrastructure());
        assert!(!CoreError::NotOwner { id: 1 }.is_infrastructure());
        assert!(!CoreError::NotApproved { user_id: 9 }.is_infrastructure());
        assert!(!CoreError::NotAvailable {
            id: 1,
            status: RequestStatus::Claimed
        }
        .is_infrastructure());
    }

    #[test]
    fn not_available_message_names_the_status() {
        let err = CoreError::NotAvailable {
            id: 42,
            status: RequestStatus::Delivered,
        };
        assert_eq!(err.to_string(), "Request 42 is not available (status: delivered)");
    }
}
