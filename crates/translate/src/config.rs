use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatCompletionsTranslator;
use crate::error::TranslateError;
use crate::passthrough::PassthroughTranslator;
use crate::Translator;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LOCAL_MODEL: &str = "local";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which translation backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorBackend {
    /// Hosted OpenAI chat-completions API.
    OpenAi,
    /// A local model server speaking the same protocol.
    Local,
    /// No translation; the original text is posted as-is.
    Passthrough,
}

/// Translator settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub backend: TranslatorBackend,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub local_model_url: Option<String>,
    pub local_model_name: String,
    pub timeout: Duration,
}

impl TranslatorConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                      |
    /// |--------------------------|------------------------------|
    /// | `TRANSLATOR_BACKEND`     | inferred (see below)         |
    /// | `OPENAI_API_KEY`         | none                         |
    /// | `OPENAI_MODEL`           | `gpt-4o-mini`                |
    /// | `OPENAI_BASE_URL`        | `https://api.openai.com/v1`  |
    /// | `LOCAL_MODEL_URL`        | none                         |
    /// | `LOCAL_MODEL_NAME`       | `local`                      |
    /// | `TRANSLATE_TIMEOUT_SECS` | `30`                         |
    ///
    /// Without `TRANSLATOR_BACKEND`, an API key selects `openai`, else a
    /// local model URL selects `local`, else `passthrough`.
    pub fn from_env() -> Result<Self, TranslateError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, TranslateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let openai_api_key = var("OPENAI_API_KEY");
        let local_model_url = var("LOCAL_MODEL_URL");

        let backend = match var("TRANSLATOR_BACKEND").as_deref() {
            Some("openai") => TranslatorBackend::OpenAi,
            Some("local") => TranslatorBackend::Local,
            Some("passthrough") => TranslatorBackend::Passthrough,
            Some(other) => {
                return Err(TranslateError::Config(format!(
                    "TRANSLATOR_BACKEND must be openai, local or passthrough, got '{other}'"
                )))
            }
            None if openai_api_key.is_some() => TranslatorBackend::OpenAi,
            None if local_model_url.is_some() => TranslatorBackend::Local,
            None => TranslatorBackend::Passthrough,
        };

        let timeout_secs = match var("TRANSLATE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                TranslateError::Config(format!("TRANSLATE_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            backend,
            openai_api_key,
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            local_model_url,
            local_model_name: var("LOCAL_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.into()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Construct the configured backend.
    pub fn build(&self) -> Result<Arc<dyn Translator>, TranslateError> {
        let translator: Arc<dyn Translator> = match self.backend {
            TranslatorBackend::OpenAi => {
                let key = self.openai_api_key.clone().ok_or_else(|| {
                    TranslateError::Config("OPENAI_API_KEY is required for the openai backend".into())
                })?;
                Arc::new(ChatCompletionsTranslator::new(
                    "openai",
                    &self.openai_base_url,
                    Some(key),
                    &self.openai_model,
                    self.timeout,
                )?)
            }
            TranslatorBackend::Local => {
                let url = self.local_model_url.as_deref().ok_or_else(|| {
                    TranslateError::Config("LOCAL_MODEL_URL is required for the local backend".into())
                })?;
                Arc::new(ChatCompletionsTranslator::new(
                    "local",
                    url,
                    None,
                    &self.local_model_name,
                    self.timeout,
                )?)
            }
            TranslatorBackend::Passthrough => {
                tracing::warn!("No translation backend configured, posting requests untranslated");
                Arc::new(PassthroughTranslator)
            }
        };

        tracing::info!(backend = translator.name(), "Translator ready");
        Ok(translator)
    }
}
