use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grocery_core::error::CoreError;
use serde_json::json;

use crate::telegram::TelegramError;

/// Generic reply for failures whose detail must stay in the logs.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Application-level error for command handlers and HTTP routes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the lifecycle.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),

    /// Malformed command input; the message is a usage hint.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Webhook delivery without the expected secret token.
    #[error("Unauthorized")]
    Unauthorized,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Storage, translation and transport failures.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            AppError::Core(core) => core.is_infrastructure(),
            AppError::Telegram(_) => true,
            AppError::BadRequest(_) | AppError::Unauthorized => false,
        }
    }

    /// The chat reply for this error.
    ///
    /// Rejections get a specific message. Infrastructure failures are
    /// logged here with detail and answered generically.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    format!("{} #{id} not found.", capitalize(entity))
                }
                CoreError::NotAvailable { id, status } => {
                    format!("Request #{id} is not available (status: {status}).")
                }
                CoreError::NotApproved { .. } => {
                    "You're not yet approved as a volunteer. Please contact a coordinator."
                        .to_string()
                }
                CoreError::NotCoordinator { .. } => {
                    "Only coordinators can do that.".to_string()
                }
                CoreError::NotOwner { id } => {
                    format!("Request #{id} is not claimed by you.")
                }
                CoreError::Validation(msg) => msg.clone(),
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Storage error");
                    GENERIC_FAILURE.to_string()
                }
                CoreError::Translation(msg) => {
                    tracing::error!(error = %msg, "Translation error");
                    "Translation failed. Please try again.".to_string()
                }
            },
            AppError::Telegram(e) => {
                tracing::error!(error = %e, "Telegram error");
                GENERIC_FAILURE.to_string()
            }
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Unauthorized => "Unauthorized".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid webhook secret".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            other => {
                tracing::error!(error = %other, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
