//! User entity

use serde::{Deserialize, Serialize};

/// A platform user, including the bot's own identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    /// Platform-wide open id, present when the application has the scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_openid: Option<String>,
}
