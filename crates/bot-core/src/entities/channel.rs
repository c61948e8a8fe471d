//! Channel entity

use serde::{Deserialize, Serialize};

/// Channel kinds
///
/// Wire values are sparse; unknown values round-trip through `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ChannelType {
    Text,
    Voice,
    Category,
    Live,
    Application,
    Forum,
    Unknown(u32),
}

impl From<u32> for ChannelType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Text,
            2 => Self::Voice,
            4 => Self::Category,
            10005 => Self::Live,
            10006 => Self::Application,
            10007 => Self::Forum,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelType> for u32 {
    fn from(value: ChannelType) -> Self {
        match value {
            ChannelType::Text => 0,
            ChannelType::Voice => 2,
            ChannelType::Category => 4,
            ChannelType::Live => 10005,
            ChannelType::Application => 10006,
            ChannelType::Forum => 10007,
            ChannelType::Unknown(other) => other,
        }
    }
}

impl Default for ChannelType {
    fn default() -> Self {
        Self::Text
    }
}

/// A channel within a guild
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub owner_id: String,
}
