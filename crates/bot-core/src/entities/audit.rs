//! Message audit entity

use serde::{Deserialize, Serialize};

/// Result of a message audit, delivered as MESSAGE_AUDIT_PASS or
/// MESSAGE_AUDIT_REJECT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAudit {
    #[serde(default)]
    pub audit_id: String,
    /// Only present when the audit passed
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub audit_time: String,
    #[serde(default)]
    pub create_time: String,
}
