//! Request bodies for the resource calls

use bot_core::MessageRef;
use serde::{Deserialize, Serialize};

/// Body for posting a message to a channel or DM session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageToCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Image URL to attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Id of the message being replied to; present means a passive reply,
    /// which the platform rate-limits differently from active pushes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageRef>,
}

impl MessageToCreate {
    /// A plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A passive reply to the given message
    #[must_use]
    pub fn reply(msg_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            msg_id: Some(msg_id.into()),
            ..Self::default()
        }
    }
}

/// Body for creating a direct-message session with a guild member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDirectMessage {
    /// The user to open the session with
    pub recipient_id: String,
    /// The guild the conversation starts from
    pub source_guild_id: String,
}

/// An established direct-message session
///
/// `guild_id` is a pseudo guild carrying the DM channel; use it as the
/// target for [`crate::ApiClient::post_direct_message`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectMessageSession {
    pub guild_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub create_time: String,
}
