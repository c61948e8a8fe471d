//! Gateway connection info
//!
//! Returned by the REST `/gateway/bot` call and consumed by the session
//! manager to size and throttle shard startup.

use serde::{Deserialize, Serialize};

/// Gateway access point info
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    /// WebSocket connect URL
    pub url: String,
    /// Recommended shard count
    pub shards: u32,
    pub session_start_limit: SessionStartLimit,
}

/// Connection admission limits for session startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartLimit {
    /// Total connection slots in the current window
    pub total: u32,
    /// Slots still available
    pub remaining: u32,
    /// Milliseconds until the window resets
    pub reset_after: u32,
    /// Max handshakes admitted per rolling 5-second window
    pub max_concurrency: u32,
}
