//! REST client for the Telegram Bot API.
//!
//! Every method is a `POST {api_url}/bot{token}/{method}` with a JSON
//! body, answered by an [`ApiResponse`] envelope.

use std::time::Duration;

use grocery_core::types::TelegramId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::types::{ApiResponse, Message, Update, User};

/// Errors from the Bot API layer.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Telegram rejected the call.
    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },

    /// A success response whose body did not match the expected shape.
    #[error("Unexpected Telegram response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client bound to one bot token.
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    /// Create a client.
    ///
    /// * `api_url` - Bot API root, normally `https://api.telegram.org`.
    /// * `timeout` - Per-request timeout; must exceed the long-poll timeout.
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// The bot's own account.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for updates with `update_id >= offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout.as_secs(),
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: TelegramId,
        text: &str,
    ) -> Result<Message, TelegramError> {
        self.call(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "link_preview_options": { "is_disabled": true },
            }),
        )
        .await
    }

    /// Register `url` as the webhook. Telegram echoes `secret` back in the
    /// `X-Telegram-Bot-Api-Secret-Token` header of every delivery.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), TelegramError> {
        let mut params = json!({
            "url": url,
            "allowed_updates": ["message"],
        });
        if let Some(secret) = secret {
            params["secret_token"] = json!(secret);
        }
        let _: bool = self.call("setWebhook", &params).await?;
        Ok(())
    }

    /// Remove any webhook so `getUpdates` can be used.
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }

    // ---- private helpers ----

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(TelegramError::Api {
                    status: status.as_u16(),
                    description: body,
                })
            }
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                status: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::Api {
            status: status.as_u16(),
            description: format!("{method} returned no result"),
        })
    }
}
