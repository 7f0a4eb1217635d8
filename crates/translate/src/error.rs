/// Errors from a translation backend.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status code.
    #[error("Translation API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The backend answered but produced no text.
    #[error("Translation backend returned an empty result")]
    Empty,

    /// The backend could not be configured.
    #[error("Invalid translator configuration: {0}")]
    Config(String),
}
