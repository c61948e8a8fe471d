//! Token errors

use thiserror::Error;

/// Credential fetch and refresh errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Network or protocol failure talking to the authority endpoint
    #[error("credential request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The authority answered but rejected the request
    #[error("credential authority rejected request: {code}: {message}")]
    Authority { code: i64, message: String },

    /// The authority answered with a body we could not interpret
    #[error("credential response malformed: {0}")]
    Malformed(String),
}

impl TokenError {
    /// Whether a retry with the same inputs can reasonably succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            // A rejected app id / secret will not fix itself
            Self::Authority { .. } | Self::Malformed(_) => false,
        }
    }
}
