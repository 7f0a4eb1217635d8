//! Coordinator membership.
//!
//! The coordinator set is fixed at startup from configuration and handed
//! to the lifecycle controller at construction, so tests can substitute
//! any set they like.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::types::TelegramId;

/// Immutable set of coordinator Telegram ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSet {
    ids: BTreeSet<TelegramId>,
}

impl CoordinatorSet {
    /// Build the set. At least one coordinator is required, otherwise
    /// nobody could create requests or approve volunteers.
    pub fn new(ids: impl IntoIterator<Item = TelegramId>) -> Result<Self, CoreError> {
        let ids: BTreeSet<TelegramId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(CoreError::Validation(
                "at least one coordinator id is required".to_string(),
            ));
        }
        Ok(Self { ids })
    }

    pub fn contains(&self, id: TelegramId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = TelegramId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
