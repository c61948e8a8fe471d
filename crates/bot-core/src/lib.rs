//! # bot-core
//!
//! Domain layer containing intents, event types, and the wire entities
//! carried by gateway dispatch frames. This crate has zero dependencies on
//! infrastructure (transport, HTTP client, etc.).

pub mod entities;
pub mod events;
pub mod gateway;
pub mod intents;

// Re-export commonly used types at crate root
pub use entities::{
    AudioAction, Channel, ChannelType, Emoji, Guild, Member, Message, MessageAttachment,
    MessageAudit, MessageRef, MessageReaction, ReactionTarget, User,
};
pub use events::{events_to_intent, EventType};
pub use gateway::{GatewayInfo, SessionStartLimit};
pub use intents::Intent;
