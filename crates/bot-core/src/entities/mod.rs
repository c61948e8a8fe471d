//! Wire entities carried by gateway dispatch frames and REST responses

mod audio;
mod audit;
mod channel;
mod guild;
mod member;
mod message;
mod reaction;
mod user;

pub use audio::AudioAction;
pub use audit::MessageAudit;
pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::Member;
pub use message::{Message, MessageAttachment, MessageRef};
pub use reaction::{Emoji, MessageReaction, ReactionTarget};
pub use user::User;
