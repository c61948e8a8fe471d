//! REST client errors

use bot_token::TokenError;
use serde::Deserialize;
use thiserror::Error;

/// REST request errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout, or response-decoding failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential fetch failed before the request could be sent
    #[error("credential error: {0}")]
    Credential(#[from] TokenError),

    /// The API answered with a non-success status
    #[error("api returned {status} (code {code}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Platform business error code, 0 when the body carried none
        code: i64,
        message: String,
        /// Trace id for reporting problems to the platform
        trace_id: String,
    },
}

impl ApiError {
    /// Whether this is a 4xx response
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// Whether this is a 5xx response
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (500..600).contains(status))
    }

    /// The trace id of the failing response, if any
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        match self {
            Self::Status { trace_id, .. } if !trace_id.is_empty() => Some(trace_id),
            _ => None,
        }
    }
}

/// Error body shape the API uses for non-success responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Extract `{code, message}` from an error body, tolerating anything else
#[must_use]
pub(crate) fn parse_error_body(body: &str) -> (i64, String) {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() || parsed.code != 0 => {
            (parsed.code, parsed.message)
        }
        _ => (0, body.chars().take(256).collect()),
    }
}
