//! Decides whether a reaction event is actionable and which role it targets.

use reaction_store::AssociationStore;
use reaction_types::{EmojiKey, GuildConfig, ReactionEvent};

/// Role targeted by `event`, or `None` when the event must be ignored.
///
/// Ignored: the bot's own reactions, guilds without a configured message,
/// reactions on any other message, and emoji without an association.
pub fn resolve(
    store: &dyn AssociationStore,
    config: Option<&GuildConfig>,
    key: &EmojiKey,
    self_user_id: u64,
    event: &ReactionEvent,
) -> Option<u64> {
    if event.user_id == self_user_id {
        return None;
    }

    let config = config?;
    if config.guild_id != event.guild_id || config.message_id != event.message_id {
        return None;
    }

    store.role_association(event.guild_id, key)
}
