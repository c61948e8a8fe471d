//! Message reaction entity

use serde::{Deserialize, Serialize};

/// A reaction added to or removed from a reaction target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReaction {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub target: ReactionTarget,
    #[serde(default)]
    pub emoji: Emoji,
}

/// What the reaction was applied to
///
/// `target_type` 0 = message, 1 = feed, 2 = comment, 3 = reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTarget {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub target_type: i32,
}

/// Emoji used in a reaction
///
/// `emoji_type` 1 = system emoji, 2 = custom emoji.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub emoji_type: i32,
}
