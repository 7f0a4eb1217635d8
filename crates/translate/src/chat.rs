//! Client for OpenAI-compatible `chat/completions` endpoints.
//!
//! The hosted API and local model servers (llama.cpp, vLLM, Ollama's
//! compatibility layer) accept the same request shape, so one client
//! serves both backends.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TranslateError;
use crate::prompt;
use crate::Translator;

/// Low temperature keeps the bullet formatting consistent.
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 1024;

/// Translator backed by a chat-completions HTTP API.
pub struct ChatCompletionsTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsTranslator {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// `timeout` bounds each whole request, including reading the body.
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            model: model.into(),
            name,
        })
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TranslateError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TranslateError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Translator for ChatCompletionsTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let user = prompt::user_message(text);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = Self::ensure_success(request.send().await?).await?;
        let parsed: ChatResponse = response.json().await?;

        let translated = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            tracing::warn!(backend = self.name, model = %self.model, "Empty translation");
            return Err(TranslateError::Empty);
        }
        Ok(translated)
    }

    fn name(&self) -> &str {
        self.name
    }
}
