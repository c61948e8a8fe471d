//! Subscription intents
//!
//! Bitmask flags requesting classes of events from the gateway. The server
//! only delivers event classes whose bit is set in the identify frame.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway subscription intents
    ///
    /// Serialized as the raw integer in identify frames.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intent: u32 {
        /// Guild lifecycle and channel lifecycle events
        const GUILDS                  = 1 << 0;
        /// Guild member add/update/remove events
        const GUILD_MEMBERS           = 1 << 1;
        /// All messages posted in guild channels
        const GUILD_MESSAGES          = 1 << 9;
        /// Reaction add/remove events in guild channels
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Direct messages to the bot
        const DIRECT_MESSAGES         = 1 << 12;
        /// Message audit pass/reject results
        const AUDIT                   = 1 << 27;
        /// Audio playback lifecycle events
        const AUDIO                   = 1 << 29;
        /// Only messages that @-mention the bot
        const GUILD_AT_MESSAGES       = 1 << 30;
    }
}

impl Intent {
    /// Raw integer value carried in the identify frame
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.bits()
    }
}

impl Serialize for Intent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Intent::from_bits_retain(bits))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
