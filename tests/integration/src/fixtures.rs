//! Shared fixtures

use async_trait::async_trait;
use bot_core::{GatewayInfo, SessionStartLimit};
use bot_token::{TokenError, TokenSource};

/// A token source with a fixed credential, for tests that do not exercise
/// the credential manager
pub struct StaticToken;

#[async_trait]
impl TokenSource for StaticToken {
    async fn credential(&self) -> Result<String, TokenError> {
        Ok("Bot test-token".to_string())
    }

    fn app_id(&self) -> &str {
        "100001"
    }
}

/// Gateway info pointing at a mock gateway
#[must_use]
pub fn gateway_info(url: &str, shards: u32, remaining: u32, max_concurrency: u32) -> GatewayInfo {
    GatewayInfo {
        url: url.to_string(),
        shards,
        session_start_limit: SessionStartLimit {
            total: 1000,
            remaining,
            reset_after: 0,
            max_concurrency,
        },
    }
}
