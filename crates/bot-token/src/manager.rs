//! Token manager
//!
//! Owns the cached credential, coalesces concurrent fetches, and runs the
//! background refresh loop.

use crate::access_token::AccessToken;
use crate::error::TokenError;
use bot_common::BotConfig;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default credential authority endpoint
const DEFAULT_AUTH_URL: &str = "https://bots.guildplatform.com/app/getAppAccessToken";

/// Token type tag presented in authorization headers
const TOKEN_TYPE: &str = "Bot";

/// Reserved headroom so the refresh lands before actual expiry
const SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// Floor for the refresh timer, so a bad TTL cannot spin the loop
const MIN_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// Upper bound (exclusive) of the random jitter subtracted from the delay,
/// so many bot processes sharing one authority do not refresh in lockstep
const JITTER_UPPER_SECS: u64 = 10;

/// Retry delay after a failed background refresh
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Consecutive background failures tolerated before aborting loudly
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Capacity of the force-refresh signal queue
const FORCE_REFRESH_CAPACITY: usize = 10;

/// HTTP timeout for authority requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle state of the background refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// `start_refresh` has not run yet
    Uninitialized = 0,
    /// Background loop is running
    Working = 1,
    /// Background loop observed cancellation and exited
    Stopped = 2,
}

/// Credential manager for one bot application
///
/// `token()` serves the cached snapshot when valid and otherwise performs a
/// single coalesced fetch; the background loop keeps the snapshot fresh so
/// the common path never waits on the network.
pub struct TokenManager {
    app_id: String,
    secret: String,
    auth_url: String,
    http: reqwest::Client,
    /// Read-mostly snapshot; swapped whole on refresh, never mutated in place
    cached: RwLock<Option<Arc<AccessToken>>>,
    /// Serializes fetches so concurrent expired callers collapse into one
    /// network request
    fetch_lock: tokio::sync::Mutex<()>,
    force_tx: mpsc::Sender<String>,
    force_rx: Mutex<Option<mpsc::Receiver<String>>>,
    refresh_started: AtomicBool,
    state: AtomicU8,
}

impl TokenManager {
    /// Create a manager for the given application credentials
    #[must_use]
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        let (force_tx, force_rx) = mpsc::channel(FORCE_REFRESH_CAPACITY);
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            http: reqwest::Client::new(),
            cached: RwLock::new(None),
            fetch_lock: tokio::sync::Mutex::new(()),
            force_tx,
            force_rx: Mutex::new(Some(force_rx)),
            refresh_started: AtomicBool::new(false),
            state: AtomicU8::new(ManagerState::Uninitialized as u8),
        }
    }

    /// Build a manager from a loaded [`BotConfig`]
    #[must_use]
    pub fn from_config(config: &BotConfig) -> Self {
        let mut manager = Self::new(&config.app_id, &config.secret);
        if let Some(url) = &config.auth_url {
            manager.auth_url = url.clone();
        }
        manager
    }

    /// Override the credential authority endpoint
    #[must_use]
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// The application id these credentials belong to
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn cached(&self) -> Option<Arc<AccessToken>> {
        self.cached.read().clone()
    }

    fn store(&self, token: Arc<AccessToken>) {
        *self.cached.write() = Some(token);
    }

    /// Get the current credential, fetching if the cached one expired
    ///
    /// Concurrent callers during a fetch collapse into one in-flight request:
    /// the first caller fetches under the lock, the rest observe the fresh
    /// snapshot after the lock is released.
    pub async fn token(&self) -> Result<Arc<AccessToken>, TokenError> {
        if let Some(token) = self.cached().filter(|token| token.is_valid()) {
            return Ok(token);
        }

        let _guard = self.fetch_lock.lock().await;
        // Another caller may have refreshed while we waited on the lock
        if let Some(token) = self.cached().filter(|token| token.is_valid()) {
            return Ok(token);
        }

        let token = self.fetch().await?;
        self.store(token.clone());
        Ok(token)
    }

    /// The authorization header value for the current credential
    pub async fn authorization(&self) -> Result<String, TokenError> {
        Ok(self.token().await?.authorization())
    }

    /// Refresh unconditionally, replacing a still-valid snapshot
    async fn refresh(&self) -> Result<Arc<AccessToken>, TokenError> {
        let _guard = self.fetch_lock.lock().await;
        let token = self.fetch().await?;
        self.store(token.clone());
        Ok(token)
    }

    async fn fetch(&self) -> Result<Arc<AccessToken>, TokenError> {
        debug!(app_id = %self.app_id, url = %self.auth_url, "retrieving access token");
        let response = self
            .http
            .post(&self.auth_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&AuthorityRequest {
                app_id: &self.app_id,
                client_secret: &self.secret,
            })
            .send()
            .await?;

        let body: AuthorityResponse = response.json().await?;
        if body.code != 0 {
            return Err(TokenError::Authority {
                code: body.code,
                message: body.message,
            });
        }
        if body.access_token.is_empty() {
            return Err(TokenError::Malformed("empty access_token".to_string()));
        }

        debug!(expires_in = body.expires_in, "access token retrieved");
        Ok(Arc::new(AccessToken::new(
            body.access_token,
            TOKEN_TYPE,
            Duration::from_secs(body.expires_in),
        )))
    }

    /// Wake the background loop for an immediate refresh
    ///
    /// Best effort: returns false when the signal queue is full (a refresh
    /// is already imminent) or the loop is not running.
    pub fn force_refresh(&self, reason: impl Into<String>) -> bool {
        match self.force_tx.try_send(reason.into()) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "force refresh signal dropped");
                false
            }
        }
    }

    /// Lifecycle state of the background loop
    #[must_use]
    pub fn state(&self) -> ManagerState {
        match self.state.load(Ordering::Acquire) {
            1 => ManagerState::Working,
            2 => ManagerState::Stopped,
            _ => ManagerState::Uninitialized,
        }
    }

    fn set_state(&self, state: ManagerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Start the background refresh loop, idempotently
    ///
    /// Performs the initial fetch synchronously: a failure here is surfaced
    /// to the caller (nothing can authenticate without a first credential)
    /// and leaves the manager startable again. Returns false when the loop
    /// is already running.
    pub async fn start_refresh(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> Result<bool, TokenError> {
        if self
            .refresh_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        if let Err(err) = self.token().await {
            self.refresh_started.store(false, Ordering::Release);
            return Err(err);
        }

        let Some(force_rx) = self.force_rx.lock().take() else {
            // Receiver already consumed by a previous (stopped) loop
            return Ok(false);
        };

        self.set_state(ManagerState::Working);
        let manager = Arc::clone(self);
        tokio::spawn(manager.refresh_loop(cancel, force_rx));
        Ok(true)
    }

    async fn refresh_loop(
        self: Arc<Self>,
        cancel: CancellationToken,
        mut force_rx: mpsc::Receiver<String>,
    ) {
        let mut consecutive_failures: u32 = 0;
        loop {
            let delay = if consecutive_failures > 0 {
                RETRY_BACKOFF
            } else {
                match self.cached() {
                    Some(token) => refresh_delay(token.remaining()),
                    None => RETRY_BACKOFF,
                }
            };
            debug!(delay_secs = delay.as_secs(), "next token refresh scheduled");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                reason = force_rx.recv() => {
                    match reason {
                        Some(reason) => info!(%reason, "force refreshing access token"),
                        None => {
                            // All senders dropped with the manager; nothing to do
                            self.set_state(ManagerState::Stopped);
                            return;
                        }
                    }
                }
                () = cancel.cancelled() => {
                    warn!("token refresh loop cancelled");
                    self.set_state(ManagerState::Stopped);
                    return;
                }
            }

            match self.refresh().await {
                Ok(token) => {
                    consecutive_failures = 0;
                    debug!(
                        expires_in = token.expires_in().as_secs(),
                        "access token refreshed"
                    );
                }
                Err(err) => {
                    consecutive_failures += 1;
                    error!(
                        %err,
                        consecutive_failures,
                        "access token refresh failed, serving last good credential"
                    );
                    if consecutive_failures > MAX_CONSECUTIVE_FAILURES {
                        panic!(
                            "access token refresh failed {consecutive_failures} times in a row"
                        );
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("app_id", &self.app_id)
            .field("auth_url", &self.auth_url)
            .field("state", &self.state())
            .finish()
    }
}

/// Compute how long to wait before the next refresh
///
/// Reserves [`SAFETY_MARGIN`] ahead of expiry and subtracts a small random
/// jitter; a TTL already inside the margin refreshes near-immediately but
/// never with a non-positive delay.
fn refresh_delay(ttl: Duration) -> Duration {
    if ttl < SAFETY_MARGIN {
        return ttl.max(MIN_REFRESH_DELAY);
    }
    let mut delay = ttl - SAFETY_MARGIN;
    if delay < MIN_REFRESH_DELAY {
        delay = MIN_REFRESH_DELAY;
    }
    if delay.as_secs() > JITTER_UPPER_SECS {
        let jitter = rand::thread_rng().gen_range(0..JITTER_UPPER_SECS);
        delay -= Duration::from_secs(jitter);
    }
    delay
}

#[derive(Serialize)]
struct AuthorityRequest<'a> {
    #[serde(rename = "appId")]
    app_id: &'a str,
    #[serde(rename = "clientSecret")]
    client_secret: &'a str,
}

/// Authority response body
///
/// `expires_in` arrives as a string on some deployments and a number on
/// others; both are accepted.
#[derive(Debug, Deserialize)]
struct AuthorityResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    access_token: String,
    #[serde(default, deserialize_with = "permissive_u64")]
    expires_in: u64,
}

fn permissive_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
