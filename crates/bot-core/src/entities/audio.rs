//! Audio event entity

use serde::{Deserialize, Serialize};

/// Audio playback state change in a voice channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAction {
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub channel_id: String,
    /// Only present on AUDIO_START and AUDIO_FINISH
    #[serde(default)]
    pub audio_url: String,
    /// Display text for the playback, only on start/finish
    #[serde(default)]
    pub text: String,
}
