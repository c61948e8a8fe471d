//! Handler registry
//!
//! One slot per callback kind, shared by every shard of a process: shards
//! carry disjoint guild partitions of the same logical bot, so one set of
//! callbacks serves them all. Built once before the session manager starts
//! and passed by shared ownership into each connection.

use super::event::Event;
use super::handler::{Callback, Handler, HandlerError, HandlerResult, PlainCallback};
use bot_core::{
    AudioAction, Channel, EventType, Guild, Intent, Member, Message, MessageAudit, MessageReaction,
};
use serde::de::DeserializeOwned;

/// Registry of user callbacks, one slot per event class
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    plain: Option<PlainCallback>,
    guild: Option<Callback<Guild>>,
    guild_member: Option<Callback<Member>>,
    channel: Option<Callback<Channel>>,
    message: Option<Callback<Message>>,
    at_message: Option<Callback<Message>>,
    direct_message: Option<Callback<Message>>,
    reaction: Option<Callback<MessageReaction>>,
    audio: Option<Callback<AudioAction>>,
    message_audit: Option<Callback<MessageAudit>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register callbacks and return the intent bitmask they imply
    ///
    /// Last registration wins per kind. The returned mask is what must be
    /// passed into the identify frame; registering after session start does
    /// not retroactively add intents.
    pub fn register(&mut self, handlers: impl IntoIterator<Item = Handler>) -> Intent {
        let mut intent = Intent::empty();
        for handler in handlers {
            intent |= handler.intent();
            match handler {
                Handler::Plain(f) => self.plain = Some(f),
                Handler::Guild(f) => self.guild = Some(f),
                Handler::GuildMember(f) => self.guild_member = Some(f),
                Handler::Channel(f) => self.channel = Some(f),
                Handler::Message(f) => self.message = Some(f),
                Handler::AtMessage(f) => self.at_message = Some(f),
                Handler::DirectMessage(f) => self.direct_message = Some(f),
                Handler::Reaction(f) => self.reaction = Some(f),
                Handler::Audio(f) => self.audio = Some(f),
                Handler::MessageAudit(f) => self.message_audit = Some(f),
            }
        }
        intent
    }

    /// Decode a dispatch event and route it to the matching callback
    ///
    /// Events without a more specific registered handler fall through to the
    /// plain callback; with no plain callback either, the event is dropped.
    pub fn dispatch(&self, event: &Event) -> HandlerResult {
        match event.event_type {
            Some(EventType::GuildCreate | EventType::GuildUpdate | EventType::GuildDelete) => {
                self.dispatch_typed(event, &self.guild)
            }
            Some(
                EventType::GuildMemberAdd
                | EventType::GuildMemberUpdate
                | EventType::GuildMemberRemove,
            ) => self.dispatch_typed(event, &self.guild_member),
            Some(EventType::ChannelCreate | EventType::ChannelUpdate | EventType::ChannelDelete) => {
                self.dispatch_typed(event, &self.channel)
            }
            Some(EventType::MessageCreate) => self.dispatch_typed(event, &self.message),
            Some(EventType::AtMessageCreate) => self.dispatch_typed(event, &self.at_message),
            Some(EventType::DirectMessageCreate) => {
                self.dispatch_typed(event, &self.direct_message)
            }
            Some(EventType::MessageReactionAdd | EventType::MessageReactionRemove) => {
                self.dispatch_typed(event, &self.reaction)
            }
            Some(
                EventType::AudioStart
                | EventType::AudioFinish
                | EventType::AudioOnMic
                | EventType::AudioOffMic,
            ) => self.dispatch_typed(event, &self.audio),
            Some(EventType::MessageAuditPass | EventType::MessageAuditReject) => {
                self.dispatch_typed(event, &self.message_audit)
            }
            // READY is intercepted by the connection; RESUMED and unknown
            // types only make sense to a passthrough consumer
            Some(EventType::Ready | EventType::Resumed) | None => self.dispatch_plain(event),
        }
    }

    fn dispatch_typed<T: DeserializeOwned>(
        &self,
        event: &Event,
        slot: &Option<Callback<T>>,
    ) -> HandlerResult {
        let Some(callback) = slot else {
            return self.dispatch_plain(event);
        };
        let data: T =
            serde_json::from_value(event.data.clone()).map_err(|source| HandlerError::Decode {
                event_type: event.raw_type.clone(),
                source,
            })?;
        callback(event, &data)
    }

    fn dispatch_plain(&self, event: &Event) -> HandlerResult {
        match &self.plain {
            Some(callback) => callback(event),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("plain", &self.plain.is_some())
            .field("guild", &self.guild.is_some())
            .field("guild_member", &self.guild_member.is_some())
            .field("channel", &self.channel.is_some())
            .field("message", &self.message.is_some())
            .field("at_message", &self.at_message.is_some())
            .field("direct_message", &self.direct_message.is_some())
            .field("reaction", &self.reaction.is_some())
            .field("audio", &self.audio.is_some())
            .field("message_audit", &self.message_audit.is_some())
            .finish()
    }
}
