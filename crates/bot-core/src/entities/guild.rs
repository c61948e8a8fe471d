//! Guild entity

use serde::{Deserialize, Serialize};

/// A guild the bot has been added to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner_id: String,
    /// Whether the current operator is the guild owner
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub member_count: i64,
    #[serde(default)]
    pub max_members: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}
