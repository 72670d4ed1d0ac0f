//! serenity model → reaction-types conversions.
//!
//! Gateway payloads are parsed into typed events once, here, and only the
//! typed values travel further.

use reaction_types::{IncomingMessage, RawEmoji, ReactionEvent, ReactionKind};
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

/// Typed reaction event, or `None` for reactions outside a guild or without
/// a reacting user.
pub fn reaction_event(kind: ReactionKind, reaction: &Reaction) -> Option<ReactionEvent> {
    reaction_event_from_parts(
        kind,
        reaction.guild_id,
        reaction.user_id,
        reaction.channel_id,
        reaction.message_id,
        &reaction.emoji,
    )
}

pub(crate) fn reaction_event_from_parts(
    kind: ReactionKind,
    guild_id: Option<GuildId>,
    user_id: Option<UserId>,
    channel_id: ChannelId,
    message_id: MessageId,
    emoji: &ReactionType,
) -> Option<ReactionEvent> {
    Some(ReactionEvent {
        kind,
        guild_id: guild_id?.get(),
        channel_id: channel_id.get(),
        message_id: message_id.get(),
        user_id: user_id?.get(),
        emoji: raw_emoji(emoji),
    })
}

pub fn raw_emoji(emoji: &ReactionType) -> RawEmoji {
    match emoji {
        ReactionType::Custom { id, name, .. } => RawEmoji {
            id: Some(id.get()),
            name: name.clone(),
        },
        ReactionType::Unicode(glyph) => RawEmoji::unicode(glyph.clone()),
        _ => RawEmoji {
            id: None,
            name: None,
        },
    }
}

pub fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        message_id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|g| g.get()),
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::id::EmojiId;

    fn message_json(guild_id: Option<u64>, bot: bool, content: &str) -> serde_json::Value {
        let mut v = serde_json::json!({
            "id": "7",
            "channel_id": "3",
            "author": {
                "id": "42",
                "username": "alice",
                "global_name": null,
                "avatar": null,
                "bot": bot
            },
            "content": content,
            "timestamp": "2024-01-01T00:00:00+00:00",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "attachments": [],
            "embeds": [],
            "pinned": false,
            "type": 0
        });
        if let Some(g) = guild_id {
            v["guild_id"] = serde_json::Value::String(g.to_string());
        }
        v
    }

    fn parse_message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).expect("construct Message")
    }

    #[test]
    fn test_unicode_reaction() {
        let event = reaction_event_from_parts(
            ReactionKind::Add,
            Some(GuildId::new(1)),
            Some(UserId::new(42)),
            ChannelId::new(10),
            MessageId::new(100),
            &ReactionType::Unicode("⭐".to_string()),
        )
        .unwrap();

        assert_eq!(event.kind, ReactionKind::Add);
        assert_eq!(event.guild_id, 1);
        assert_eq!(event.user_id, 42);
        assert_eq!(event.channel_id, 10);
        assert_eq!(event.message_id, 100);
        assert_eq!(event.emoji, RawEmoji::unicode("⭐"));
    }

    #[test]
    fn test_custom_reaction_keeps_id() {
        let emoji = ReactionType::Custom {
            animated: true,
            id: EmojiId::new(555),
            name: Some("star".to_string()),
        };
        assert_eq!(raw_emoji(&emoji), RawEmoji::custom("star", 555));
    }

    #[test]
    fn test_reaction_without_guild_ignored() {
        let event = reaction_event_from_parts(
            ReactionKind::Remove,
            None,
            Some(UserId::new(42)),
            ChannelId::new(10),
            MessageId::new(100),
            &ReactionType::Unicode("⭐".to_string()),
        );
        assert!(event.is_none());
    }

    #[test]
    fn test_reaction_without_user_ignored() {
        let event = reaction_event_from_parts(
            ReactionKind::Add,
            Some(GuildId::new(1)),
            None,
            ChannelId::new(10),
            MessageId::new(100),
            &ReactionType::Unicode("⭐".to_string()),
        );
        assert!(event.is_none());
    }

    #[test]
    fn test_guild_message() {
        let msg = incoming_message(&parse_message(message_json(Some(1), false, "!ping")));
        assert_eq!(
            msg,
            IncomingMessage {
                message_id: 7,
                channel_id: 3,
                guild_id: Some(1),
                author_id: 42,
                author_is_bot: false,
                content: "!ping".to_string(),
            }
        );
    }

    #[test]
    fn test_direct_message_from_bot() {
        let msg = incoming_message(&parse_message(message_json(None, true, "hi")));
        assert_eq!(msg.guild_id, None);
        assert!(msg.author_is_bot);
    }
}
