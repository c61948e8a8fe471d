//! Gateway error types

use crate::protocol::CloseCode;
use bot_token::TokenError;
use thiserror::Error;

/// Terminal errors for a gateway connection, plus manager-level failures
///
/// The session manager uses [`GatewayError::is_resumable`] to decide whether
/// a restarted shard resumes its previous session or identifies fresh.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The session carries no gateway URL
    #[error("gateway url is empty")]
    UrlInvalid,

    /// Socket dial, read, or write failure
    #[error("websocket transport error: {0}")]
    Transport(String),

    /// The gateway asked this client to reconnect (op 7)
    #[error("gateway requested reconnect")]
    NeedReconnect,

    /// The gateway invalidated the session (op 9)
    #[error("gateway invalidated session")]
    InvalidSession,

    /// The transport was closed, possibly with a gateway close code
    #[error("connection closed (code {code:?}): {reason}")]
    Closed { code: Option<u16>, reason: String },

    /// A user callback panicked during dispatch
    #[error("event handler panicked: {0}")]
    CallbackPanic(String),

    /// Configured shard count exceeds the remaining session starts
    #[error("shard count {shards} exceeds remaining session starts {remaining}")]
    SessionLimitExceeded { shards: u32, remaining: u32 },

    /// Credential fetch failed while authenticating
    #[error("credential error: {0}")]
    Credential(#[from] TokenError),

    /// Outbound frame could not be encoded
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether the session id and sequence survive the restart
    ///
    /// Non-resumable errors require the owner to clear both before the next
    /// attempt, which then identifies fresh.
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        match self {
            Self::NeedReconnect | Self::Transport(_) | Self::CallbackPanic(_) | Self::Codec(_) => {
                true
            }
            Self::Closed { code, .. } => code
                .and_then(CloseCode::from_u16)
                .map_or(true, CloseCode::can_resume),
            Self::InvalidSession
            | Self::UrlInvalid
            | Self::SessionLimitExceeded { .. }
            | Self::Credential(_) => false,
        }
    }
}
