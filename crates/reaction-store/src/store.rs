//! Storage trait shared by the JSON file store and the in-memory test store

use reaction_types::{EmojiKey, GuildConfig};

use crate::error::Result;

/// Durable mapping of (guild, emoji) → role and guild → configured message.
///
/// Reads are served from memory and never fail. Each call is atomic on its
/// own; callers get no transaction spanning several calls.
pub trait AssociationStore: Send + Sync {
    /// Role granted by `emoji` in `guild_id`, if any.
    fn role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Option<u64>;

    /// Upsert keyed on `(guild_id, emoji)`: an existing association for the
    /// emoji is replaced.
    fn set_role_association(&self, guild_id: u64, role_id: u64, emoji: &EmojiKey) -> Result<()>;

    /// Returns `false` when no association existed.
    fn delete_role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Result<bool>;

    fn configured_message(&self, guild_id: u64) -> Option<GuildConfig>;

    /// Upsert keyed on `guild_id`.
    fn set_configured_message(&self, config: GuildConfig) -> Result<()>;

    /// Returns `false` when the guild had no configured message.
    fn delete_configured_message(&self, guild_id: u64) -> Result<bool>;
}
