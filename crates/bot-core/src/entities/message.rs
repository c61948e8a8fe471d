//! Message entity

use super::{Member, User};
use serde::{Deserialize, Serialize};

/// A message received from a guild channel or a direct-message session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    /// Ordering sequence within the channel; channels order independently
    #[serde(default)]
    pub seq_in_channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageRef>,
    /// True when received over a direct-message session
    #[serde(default)]
    pub direct_message: bool,
    /// For direct messages, the guild the conversation was initiated from
    #[serde(default)]
    pub src_guild_id: String,
}

/// File or media attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub size: i64,
}

/// Reference to a quoted message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub message_id: String,
    #[serde(default)]
    pub ignore_get_message_error: bool,
}
