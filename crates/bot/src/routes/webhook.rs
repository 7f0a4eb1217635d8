//! Telegram webhook receiver.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::telegram::Update;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /webhook -- accept one update and process it in the background.
///
/// The secret is checked before the body is parsed. Answers immediately so
/// Telegram does not redeliver while a slow translation is running.
async fn receive_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    if let Some(expected) = &state.webhook_secret {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected.as_ref()) {
            tracing::warn!("Webhook secret mismatch");
            return Err(AppError::Unauthorized);
        }
    }

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed webhook update");
        AppError::BadRequest("Malformed update".into())
    })?;

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.handle_update(update).await;
    });

    Ok(StatusCode::OK)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(receive_update))
}
