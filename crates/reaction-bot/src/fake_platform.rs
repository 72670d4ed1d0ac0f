//! Recording [`PlatformApi`] double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use reaction_types::{GuildRole, MemberSnapshot, PlatformError, WireEmoji};
use serenity::async_trait;

use crate::platform::PlatformApi;

/// A platform call as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchMember {
        guild_id: u64,
        user_id: u64,
    },
    GuildRoles {
        guild_id: u64,
    },
    AddRole {
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    },
    RemoveRole {
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    },
    AddReaction {
        channel_id: u64,
        message_id: u64,
        emoji: WireEmoji,
    },
    Reply {
        channel_id: u64,
        message_id: u64,
        content: String,
    },
}

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchMember,
    GuildRoles,
    AddRole,
    RemoveRole,
    AddReaction,
    Reply,
}

#[derive(Default)]
pub struct FakePlatform {
    members: Mutex<HashMap<(u64, u64), MemberSnapshot>>,
    roles: Mutex<HashMap<u64, Vec<GuildRole>>>,
    failures: Mutex<HashMap<Op, PlatformError>>,
    calls: Mutex<Vec<Call>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, guild_id: u64, user_id: u64, is_bot: bool, roles: &[u64]) -> Self {
        self.members.lock().unwrap().insert(
            (guild_id, user_id),
            MemberSnapshot {
                user_id,
                is_bot,
                roles: roles.to_vec(),
            },
        );
        self
    }

    pub fn with_role(self, guild_id: u64, role_id: u64, permissions: u64) -> Self {
        self.roles
            .lock()
            .unwrap()
            .entry(guild_id)
            .or_default()
            .push(GuildRole {
                id: role_id,
                permissions,
            });
        self
    }

    pub fn failing(self, op: Op, err: PlatformError) -> Self {
        self.failures.lock().unwrap().insert(op, err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the role grants and revokes.
    pub fn role_mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::AddRole { .. } | Call::RemoveRole { .. }))
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call, op: Op) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn fetch_member(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<MemberSnapshot, PlatformError> {
        self.record(Call::FetchMember { guild_id, user_id }, Op::FetchMember)?;
        self.members
            .lock()
            .unwrap()
            .get(&(guild_id, user_id))
            .cloned()
            .ok_or_else(|| PlatformError::NotFound("Unknown Member".to_string()))
    }

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<GuildRole>, PlatformError> {
        self.record(Call::GuildRoles { guild_id }, Op::GuildRoles)?;
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.record(
            Call::AddRole {
                guild_id,
                user_id,
                role_id,
            },
            Op::AddRole,
        )
    }

    async fn remove_member_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.record(
            Call::RemoveRole {
                guild_id,
                user_id,
                role_id,
            },
            Op::RemoveRole,
        )
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &WireEmoji,
    ) -> Result<(), PlatformError> {
        self.record(
            Call::AddReaction {
                channel_id,
                message_id,
                emoji: emoji.clone(),
            },
            Op::AddReaction,
        )
    }

    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            Call::Reply {
                channel_id,
                message_id,
                content: content.to_string(),
            },
            Op::Reply,
        )
    }
}
