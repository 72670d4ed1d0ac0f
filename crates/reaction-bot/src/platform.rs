//! Chat platform operations the bot performs.
//!
//! Everything that talks to Discord's REST API goes through [`PlatformApi`] so
//! the reaction and command logic can be exercised against a recording fake.

#[path = "platform_tests.rs"]
mod platform_tests;

use std::num::NonZeroU64;
use std::sync::Arc;

use reaction_types::{GuildRole, MemberSnapshot, PlatformError, WireEmoji};
use serenity::async_trait;
use serenity::builder::{CreateAllowedMentions, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId, RoleId, UserId};

use crate::errors::classify;

const AUDIT_LOG_REASON: &str = "Reaction role";

#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Live member record, including current role ids.
    async fn fetch_member(&self, guild_id: u64, user_id: u64)
        -> Result<MemberSnapshot, PlatformError>;

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<GuildRole>, PlatformError>;

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    async fn remove_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    /// React to a message as the bot.
    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &WireEmoji,
    ) -> Result<(), PlatformError>;

    /// Post `content` in `channel_id` as a reply to `message_id`.
    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError>;
}

/// [`PlatformApi`] backed by serenity's HTTP client.
pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn snowflake<T: From<NonZeroU64>>(id: u64, kind: &str) -> Result<T, PlatformError> {
    NonZeroU64::new(id)
        .map(T::from)
        .ok_or_else(|| PlatformError::NotFound(format!("{} id 0", kind)))
}

/// Convert a wire emoji into serenity's reaction type.
pub(crate) fn reaction_type(emoji: &WireEmoji) -> Result<ReactionType, PlatformError> {
    Ok(match emoji {
        WireEmoji::Unicode(glyph) => ReactionType::Unicode(glyph.clone()),
        WireEmoji::Custom { name, id } => ReactionType::Custom {
            animated: false,
            id: snowflake::<EmojiId>(*id, "emoji")?,
            name: Some(name.clone()),
        },
    })
}

#[async_trait]
impl PlatformApi for SerenityPlatform {
    async fn fetch_member(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<MemberSnapshot, PlatformError> {
        let member = self
            .http
            .get_member(
                snowflake::<GuildId>(guild_id, "guild")?,
                snowflake::<UserId>(user_id, "user")?,
            )
            .await
            .map_err(|e| classify(&e))?;

        Ok(MemberSnapshot {
            user_id: member.user.id.get(),
            is_bot: member.user.bot,
            roles: member.roles.iter().map(|r| r.get()).collect(),
        })
    }

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<GuildRole>, PlatformError> {
        let roles = self
            .http
            .get_guild_roles(snowflake::<GuildId>(guild_id, "guild")?)
            .await
            .map_err(|e| classify(&e))?;

        Ok(roles
            .iter()
            .map(|role| GuildRole {
                id: role.id.get(),
                permissions: role.permissions.bits(),
            })
            .collect())
    }

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(
                snowflake::<GuildId>(guild_id, "guild")?,
                snowflake::<UserId>(user_id, "user")?,
                snowflake::<RoleId>(role_id, "role")?,
                Some(AUDIT_LOG_REASON),
            )
            .await
            .map_err(|e| classify(&e))
    }

    async fn remove_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(
                snowflake::<GuildId>(guild_id, "guild")?,
                snowflake::<UserId>(user_id, "user")?,
                snowflake::<RoleId>(role_id, "role")?,
                Some(AUDIT_LOG_REASON),
            )
            .await
            .map_err(|e| classify(&e))
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &WireEmoji,
    ) -> Result<(), PlatformError> {
        let reaction = reaction_type(emoji)?;
        self.http
            .create_reaction(
                snowflake::<ChannelId>(channel_id, "channel")?,
                snowflake::<MessageId>(message_id, "message")?,
                &reaction,
            )
            .await
            .map_err(|e| classify(&e))
    }

    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        let channel = snowflake::<ChannelId>(channel_id, "channel")?;
        let message = snowflake::<MessageId>(message_id, "message")?;

        // Replies echo role mentions back; never let them ping anyone.
        let builder = CreateMessage::new()
            .content(content)
            .reference_message((channel, message))
            .allowed_mentions(CreateAllowedMentions::new());

        channel
            .send_message(&*self.http, builder)
            .await
            .map(|_| ())
            .map_err(|e| classify(&e))
    }
}
