//! REST client
//!
//! A thin typed wrapper over `reqwest`: every call fetches the current
//! credential, sends one request, classifies the status code, and decodes
//! the response body.

use crate::error::{parse_error_body, ApiError};
use crate::types::{CreateDirectMessage, DirectMessageSession, MessageToCreate};
use bot_core::{GatewayInfo, Message, User};
use bot_token::TokenSource;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Production API domain
const API_URL: &str = "https://api.guildplatform.com";

/// Sandbox API domain; traffic here never reaches production guilds
const SANDBOX_API_URL: &str = "https://sandbox.api.guildplatform.com";

/// Response header carrying the platform trace id
const TRACE_ID_HEADER: &str = "X-Tps-Trace-Id";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Typed REST client for the resource API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenSource>,
    timeout: Duration,
}

impl ApiClient {
    /// Client against the production domain
    #[must_use]
    pub fn new(token: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: API_URL.to_string(),
            token,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Client against the sandbox domain
    #[must_use]
    pub fn sandbox(token: Arc<dyn TokenSource>) -> Self {
        Self {
            base_url: SANDBOX_API_URL.to_string(),
            ..Self::new(token)
        }
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL (tests point this at a local mock)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    // === Gateway info ===

    /// Fetch the gateway connect URL, recommended shard count, and session
    /// start limits for this bot
    pub async fn gateway_bot(&self) -> Result<GatewayInfo, ApiError> {
        self.execute(self.http.get(self.url("/gateway/bot"))).await
    }

    // === Resource calls ===

    /// Fetch the bot's own user
    pub async fn me(&self) -> Result<User, ApiError> {
        self.execute(self.http.get(self.url("/users/@me"))).await
    }

    /// Post a message to a guild channel
    pub async fn post_message(
        &self,
        channel_id: &str,
        message: &MessageToCreate,
    ) -> Result<Message, ApiError> {
        self.execute(
            self.http
                .post(self.url(&format!("/channels/{channel_id}/messages")))
                .json(message),
        )
        .await
    }

    /// Open a direct-message session with a guild member
    pub async fn create_direct_message(
        &self,
        create: &CreateDirectMessage,
    ) -> Result<DirectMessageSession, ApiError> {
        self.execute(self.http.post(self.url("/users/@me/dms")).json(create))
            .await
    }

    /// Post a message into a direct-message session
    ///
    /// `guild_id` is the pseudo guild returned when the session was created.
    pub async fn post_direct_message(
        &self,
        guild_id: &str,
        message: &MessageToCreate,
    ) -> Result<Message, ApiError> {
        self.execute(
            self.http
                .post(self.url(&format!("/dms/{guild_id}/messages")))
                .json(message),
        )
        .await
    }

    // === Plumbing ===

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let credential = self.token.credential().await?;
        let response = builder
            .header(AUTHORIZATION, credential)
            .header("X-Union-Appid", self.token.app_id())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        debug!(status = status.as_u16(), trace_id = %trace_id, "api response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = parse_error_body(&body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                code,
                message,
                trace_id,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
