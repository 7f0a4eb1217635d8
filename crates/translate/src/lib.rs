//! Translation backends for grocery request text.
//!
//! The bot only depends on the [`Translator`] capability. Which backend
//! sits behind it (a hosted chat-completions API, a local model server
//! speaking the same protocol, or a pass-through stub) is decided once at
//! startup by [`TranslatorConfig`].

pub mod chat;
pub mod config;
pub mod error;
pub mod passthrough;
pub mod prompt;

pub use chat::ChatCompletionsTranslator;
pub use config::{TranslatorBackend, TranslatorConfig};
pub use error::TranslateError;
pub use passthrough::PassthroughTranslator;

/// Turns a family's free-form request into the public shopping list.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`. An empty result is an error, never a success.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator").field("name", &self.name()).finish()
    }
}
