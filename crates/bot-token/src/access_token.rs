//! Access token snapshot

use std::time::{Duration, Instant};

/// Validity delta: a token this close to expiry is treated as expired so
/// callers never present a credential that dies mid-request.
const VALIDITY_DELTA: Duration = Duration::from_secs(10);

/// An issued bearer credential
///
/// Immutable once issued; each refresh produces a new snapshot that
/// supersedes the old one. Readers always see either the old or the new
/// value, never a partial write.
#[derive(Debug, Clone)]
pub struct AccessToken {
    access_token: String,
    token_type: String,
    expires_at: Instant,
    expires_in: Duration,
}

impl AccessToken {
    /// Create a token snapshot expiring `expires_in` from now
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: Instant::now() + expires_in,
            expires_in,
        }
    }

    /// The raw bearer string
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The authorization header value, `"{type} {token}"`
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Whether the token can still be presented to the platform
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && self.remaining() > VALIDITY_DELTA
    }

    /// Time until actual expiry
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// The lifetime the authority reported at issue time
    #[must_use]
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }
}
