//! Callback kinds
//!
//! One tagged union over every supported callback signature. Each concrete
//! kind implies both a decoder for its payload type and an intent
//! contribution; registering a callback is the only way to request an
//! event class from the gateway.

use super::event::Event;
use bot_core::{
    events_to_intent, AudioAction, Channel, EventType, Guild, Intent, Member, Message,
    MessageAudit, MessageReaction,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by event decoding and user callbacks
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not decode as the expected type
    #[error("payload decode failed for {event_type}: {source}")]
    Decode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// The user callback reported a failure
    #[error("handler failed: {0}")]
    Failed(String),
}

impl HandlerError {
    /// Create a failure from any displayable error
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Result type for user callbacks
pub type HandlerResult = Result<(), HandlerError>;

pub(crate) type Callback<T> = Arc<dyn Fn(&Event, &T) -> HandlerResult + Send + Sync>;
pub(crate) type PlainCallback = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;

/// A user callback, tagged by the event class it handles
///
/// There is exactly one active callback per kind at a time; registering a
/// second one replaces the first.
#[derive(Clone)]
pub enum Handler {
    /// Catch-all for dispatch events without a more specific handler;
    /// receives the raw envelope and contributes no intent bits
    Plain(PlainCallback),
    /// Guild create/update/delete
    Guild(Callback<Guild>),
    /// Guild member add/update/remove
    GuildMember(Callback<Member>),
    /// Channel create/update/delete
    Channel(Callback<Channel>),
    /// All messages in guild channels
    Message(Callback<Message>),
    /// Messages that @-mention the bot
    AtMessage(Callback<Message>),
    /// Direct messages to the bot
    DirectMessage(Callback<Message>),
    /// Reaction add/remove
    Reaction(Callback<MessageReaction>),
    /// Audio playback lifecycle
    Audio(Callback<AudioAction>),
    /// Message audit results
    MessageAudit(Callback<MessageAudit>),
}

impl Handler {
    /// Catch-all passthrough handler
    pub fn plain(f: impl Fn(&Event) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Plain(Arc::new(f))
    }

    /// Guild event handler
    pub fn guild(f: impl Fn(&Event, &Guild) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Guild(Arc::new(f))
    }

    /// Guild member event handler
    pub fn guild_member(
        f: impl Fn(&Event, &Member) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::GuildMember(Arc::new(f))
    }

    /// Channel event handler
    pub fn channel(f: impl Fn(&Event, &Channel) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Channel(Arc::new(f))
    }

    /// Message event handler
    pub fn message(f: impl Fn(&Event, &Message) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Message(Arc::new(f))
    }

    /// At-message event handler
    pub fn at_message(
        f: impl Fn(&Event, &Message) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::AtMessage(Arc::new(f))
    }

    /// Direct-message event handler
    pub fn direct_message(
        f: impl Fn(&Event, &Message) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::DirectMessage(Arc::new(f))
    }

    /// Reaction event handler
    pub fn reaction(
        f: impl Fn(&Event, &MessageReaction) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::Reaction(Arc::new(f))
    }

    /// Audio event handler
    pub fn audio(
        f: impl Fn(&Event, &AudioAction) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::Audio(Arc::new(f))
    }

    /// Message audit event handler
    pub fn message_audit(
        f: impl Fn(&Event, &MessageAudit) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::MessageAudit(Arc::new(f))
    }

    /// The event classes this handler kind subscribes to
    #[must_use]
    pub fn event_types(&self) -> &'static [EventType] {
        match self {
            Self::Plain(_) => &[],
            Self::Guild(_) => &[
                EventType::GuildCreate,
                EventType::GuildUpdate,
                EventType::GuildDelete,
            ],
            Self::GuildMember(_) => &[
                EventType::GuildMemberAdd,
                EventType::GuildMemberUpdate,
                EventType::GuildMemberRemove,
            ],
            Self::Channel(_) => &[
                EventType::ChannelCreate,
                EventType::ChannelUpdate,
                EventType::ChannelDelete,
            ],
            Self::Message(_) => &[EventType::MessageCreate],
            Self::AtMessage(_) => &[EventType::AtMessageCreate],
            Self::DirectMessage(_) => &[EventType::DirectMessageCreate],
            Self::Reaction(_) => &[
                EventType::MessageReactionAdd,
                EventType::MessageReactionRemove,
            ],
            Self::Audio(_) => &[
                EventType::AudioStart,
                EventType::AudioFinish,
                EventType::AudioOnMic,
                EventType::AudioOffMic,
            ],
            Self::MessageAudit(_) => &[
                EventType::MessageAuditPass,
                EventType::MessageAuditReject,
            ],
        }
    }

    /// The intent bits implied by registering this handler
    #[must_use]
    pub fn intent(&self) -> Intent {
        events_to_intent(self.event_types())
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Plain(_) => "Plain",
            Self::Guild(_) => "Guild",
            Self::GuildMember(_) => "GuildMember",
            Self::Channel(_) => "Channel",
            Self::Message(_) => "Message",
            Self::AtMessage(_) => "AtMessage",
            Self::DirectMessage(_) => "DirectMessage",
            Self::Reaction(_) => "Reaction",
            Self::Audio(_) => "Audio",
            Self::MessageAudit(_) => "MessageAudit",
        };
        write!(f, "Handler::{kind}")
    }
}
