//! Gateway event types
//!
//! Defines all event type names carried in the `t` field of dispatch frames,
//! and the mapping from event class to the intent bit that subscribes to it.

use crate::intents::Intent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Connection events
    /// Sent after successful Identify
    Ready,
    /// Sent after successful Resume
    Resumed,

    // Guild events
    GuildCreate,
    GuildUpdate,
    GuildDelete,

    // Channel events
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,

    // Member events
    GuildMemberAdd,
    GuildMemberUpdate,
    GuildMemberRemove,

    // Message events
    MessageCreate,
    /// Message that @-mentions the bot
    AtMessageCreate,
    /// Direct message to the bot
    DirectMessageCreate,

    // Reaction events
    MessageReactionAdd,
    MessageReactionRemove,

    // Audio events
    AudioStart,
    AudioFinish,
    AudioOnMic,
    AudioOffMic,

    // Message audit events
    MessageAuditPass,
    MessageAuditReject,
}

impl EventType {
    /// Get the wire string for this event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildUpdate => "GUILD_UPDATE",
            Self::GuildDelete => "GUILD_DELETE",
            Self::ChannelCreate => "CHANNEL_CREATE",
            Self::ChannelUpdate => "CHANNEL_UPDATE",
            Self::ChannelDelete => "CHANNEL_DELETE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            Self::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::AtMessageCreate => "AT_MESSAGE_CREATE",
            Self::DirectMessageCreate => "DIRECT_MESSAGE_CREATE",
            Self::MessageReactionAdd => "MESSAGE_REACTION_ADD",
            Self::MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
            Self::AudioStart => "AUDIO_START",
            Self::AudioFinish => "AUDIO_FINISH",
            Self::AudioOnMic => "AUDIO_ON_MIC",
            Self::AudioOffMic => "AUDIO_OFF_MIC",
            Self::MessageAuditPass => "MESSAGE_AUDIT_PASS",
            Self::MessageAuditReject => "MESSAGE_AUDIT_REJECT",
        }
    }

    /// Parse an event type from its wire string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(Self::Ready),
            "RESUMED" => Some(Self::Resumed),
            "GUILD_CREATE" => Some(Self::GuildCreate),
            "GUILD_UPDATE" => Some(Self::GuildUpdate),
            "GUILD_DELETE" => Some(Self::GuildDelete),
            "CHANNEL_CREATE" => Some(Self::ChannelCreate),
            "CHANNEL_UPDATE" => Some(Self::ChannelUpdate),
            "CHANNEL_DELETE" => Some(Self::ChannelDelete),
            "GUILD_MEMBER_ADD" => Some(Self::GuildMemberAdd),
            "GUILD_MEMBER_UPDATE" => Some(Self::GuildMemberUpdate),
            "GUILD_MEMBER_REMOVE" => Some(Self::GuildMemberRemove),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            "AT_MESSAGE_CREATE" => Some(Self::AtMessageCreate),
            "DIRECT_MESSAGE_CREATE" => Some(Self::DirectMessageCreate),
            "MESSAGE_REACTION_ADD" => Some(Self::MessageReactionAdd),
            "MESSAGE_REACTION_REMOVE" => Some(Self::MessageReactionRemove),
            "AUDIO_START" => Some(Self::AudioStart),
            "AUDIO_FINISH" => Some(Self::AudioFinish),
            "AUDIO_ON_MIC" => Some(Self::AudioOnMic),
            "AUDIO_OFF_MIC" => Some(Self::AudioOffMic),
            "MESSAGE_AUDIT_PASS" => Some(Self::MessageAuditPass),
            "MESSAGE_AUDIT_REJECT" => Some(Self::MessageAuditReject),
            _ => None,
        }
    }

    /// The intent bit that subscribes to this event class
    ///
    /// READY and RESUMED are synthetic connection events and carry no intent.
    #[must_use]
    pub fn intent(self) -> Intent {
        match self {
            Self::Ready | Self::Resumed => Intent::empty(),
            Self::GuildCreate
            | Self::GuildUpdate
            | Self::GuildDelete
            | Self::ChannelCreate
            | Self::ChannelUpdate
            | Self::ChannelDelete => Intent::GUILDS,
            Self::GuildMemberAdd | Self::GuildMemberUpdate | Self::GuildMemberRemove => {
                Intent::GUILD_MEMBERS
            }
            Self::MessageCreate => Intent::GUILD_MESSAGES,
            Self::AtMessageCreate => Intent::GUILD_AT_MESSAGES,
            Self::DirectMessageCreate => Intent::DIRECT_MESSAGES,
            Self::MessageReactionAdd | Self::MessageReactionRemove => {
                Intent::GUILD_MESSAGE_REACTIONS
            }
            Self::AudioStart | Self::AudioFinish | Self::AudioOnMic | Self::AudioOffMic => {
                Intent::AUDIO
            }
            Self::MessageAuditPass | Self::MessageAuditReject => Intent::AUDIT,
        }
    }
}

/// Accumulate the intent bits for a set of event classes
#[must_use]
pub fn events_to_intent(events: &[EventType]) -> Intent {
    events
        .iter()
        .fold(Intent::empty(), |acc, e| acc | e.intent())
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
