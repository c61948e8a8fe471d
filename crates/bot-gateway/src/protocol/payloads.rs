//! Payloads for the op-dependent `d` field

use bot_core::{Intent, User};
use serde::{Deserialize, Serialize};

/// Hello payload (op 10)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Identify payload (op 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authorization string, `"{type} {token}"`
    pub token: String,
    /// Subscription bitmask; the server only sends event classes whose bit
    /// is set
    pub intents: Intent,
    /// `[shard_id, shard_count]`
    pub shard: [u32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

/// Resume payload (op 6)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    /// Last sequence number seen before the interruption
    pub seq: u64,
}

/// READY dispatch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    #[serde(default)]
    pub version: i64,
    pub session_id: String,
    pub user: User,
    /// Confirmed `[shard_id, shard_count]`
    #[serde(default)]
    pub shard: Option<[u32; 2]>,
}
