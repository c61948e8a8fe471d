//! Credential source trait
//!
//! The seam between the credential manager and its consumers: gateway
//! connections present the credential at identify/resume time, REST calls
//! on every request.

use crate::error::TokenError;
use crate::manager::TokenManager;
use async_trait::async_trait;

/// Provides the current authorization credential
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// The full authorization string, `"{type} {token}"`
    ///
    /// Blocks only when the cached credential has expired and a fetch is
    /// needed.
    async fn credential(&self) -> Result<String, TokenError>;

    /// The application id these credentials belong to
    fn app_id(&self) -> &str {
        ""
    }
}

#[async_trait]
impl TokenSource for TokenManager {
    async fn credential(&self) -> Result<String, TokenError> {
        Ok(self.token().await?.authorization())
    }

    fn app_id(&self) -> &str {
        TokenManager::app_id(self)
    }
}
