//! Request lifecycle status and its transition table.
//!
//! ```text
//! new -----(translation completes)-----> posted
//! posted ---(claim succeeds)-----------> claimed
//! claimed --(volunteer starts)---------> shopping
//! claimed/shopping --(owner completes)-> delivered   [terminal]
//! posted/claimed/shopping --(coordinator)-> cancelled [terminal]
//! ```
//!
//! Statuses are persisted as their lowercase names in a `TEXT` column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a grocery request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    New,
    Posted,
    Claimed,
    Shopping,
    Delivered,
    Cancelled,
}

/// Every status, in lifecycle order.
pub const ALL_STATUSES: [RequestStatus; 6] = [
    RequestStatus::New,
    RequestStatus::Posted,
    RequestStatus::Claimed,
    RequestStatus::Shopping,
    RequestStatus::Delivered,
    RequestStatus::Cancelled,
];

impl RequestStatus {
    /// The persisted name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Posted => "posted",
            Self::Claimed => "claimed",
            Self::Shopping => "shopping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// A volunteer currently holds the claim.
    pub fn is_active_claim(self) -> bool {
        matches!(self, Self::Claimed | Self::Shopping)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (New, Posted)
                | (Posted, Claimed)
                | (Claimed, Shopping)
                | (Claimed, Delivered)
                | (Shopping, Delivered)
                | (Posted, Cancelled)
                | (Claimed, Cancelled)
                | (Shopping, Cancelled)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a persisted status string is not one of the known names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for RequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
