//! Typed gateway events, parsed once at the platform boundary

use serde::{Deserialize, Serialize};

use crate::types::RawEmoji;

/// Whether a reaction was added or removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Reaction added: grant the associated role.
    Add,
    /// Reaction removed: revoke the associated role.
    Remove,
}

/// A reaction was added to or removed from a guild message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: u64,
    pub emoji: RawEmoji,
}

/// A text message that may carry a bot command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub channel_id: u64,
    /// `None` for direct messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub content: String,
}
