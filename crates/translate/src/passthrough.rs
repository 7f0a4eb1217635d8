use crate::error::TranslateError;
use crate::Translator;

/// Returns the input unchanged. Used when no model backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranslator;

#[async_trait::async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::Empty);
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
