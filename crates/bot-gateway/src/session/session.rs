//! Session state
//!
//! One logical connection per shard. A `Session` is owned exclusively by
//! its connection while connected and handed back to the session manager by
//! value on termination for re-dispatch.

use bot_core::Intent;
use std::fmt;

/// Shard assignment: index within a fixed shard count
///
/// `shard_id` is in `[0, shard_count)`; `shard_count` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardConfig {
    pub shard_id: u32,
    pub shard_count: u32,
}

impl ShardConfig {
    /// Create a shard pair
    #[must_use]
    pub fn new(shard_id: u32, shard_count: u32) -> Self {
        Self {
            shard_id,
            shard_count,
        }
    }
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            shard_id: 0,
            shard_count: 1,
        }
    }
}

/// State of one shard's logical gateway session
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Server-assigned session identifier; empty until the first successful
    /// handshake, and cleared before a fresh identify
    pub id: String,
    /// Gateway connect URL
    pub url: String,
    /// Subscription bitmask presented at identify time
    pub intent: Intent,
    /// Last sequence number seen; resets to zero with the session id
    pub last_seq: u64,
    /// Shard assignment
    pub shard: ShardConfig,
    /// Owning application identifier
    pub app_id: String,
}

impl Session {
    /// Create a fresh session for one shard
    #[must_use]
    pub fn new(url: impl Into<String>, intent: Intent, shard: ShardConfig) -> Self {
        Self {
            id: String::new(),
            url: url.into(),
            intent,
            last_seq: 0,
            shard,
            app_id: String::new(),
        }
    }

    /// Whether a resume is possible (a prior handshake completed)
    #[must_use]
    pub fn can_resume(&self) -> bool {
        !self.id.is_empty()
    }

    /// Forget the server-side session so the next attempt identifies fresh
    pub fn reset(&mut self) {
        self.id.clear();
        self.last_seq = 0;
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ws][ID:{}][Shard:({}/{})][Intent:{}]",
            self.id, self.shard.shard_id, self.shard.shard_count, self.intent
        )
    }
}
