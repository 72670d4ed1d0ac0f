//! Grants and revokes reaction roles against the platform.

#[path = "mutator_tests.rs"]
mod mutator_tests;

use reaction_types::{PlatformError, ReactionKind};
use tracing::{debug, info};

use crate::errors::log_event_failure;
use crate::platform::PlatformApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Grant,
    Revoke,
}

impl From<ReactionKind> for Direction {
    fn from(kind: ReactionKind) -> Self {
        match kind {
            ReactionKind::Add => Direction::Grant,
            ReactionKind::Remove => Direction::Revoke,
        }
    }
}

/// What [`apply_role`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Granted,
    Revoked,
    /// Revoke of a role the member does not hold.
    NotHeld,
    /// The member is a bot account.
    IgnoredBot,
    MemberUnavailable(PlatformError),
    Failed(PlatformError),
}

/// Apply a resolved role change to a member.
///
/// The member is always read live first. Bot members are left alone. A grant
/// is sent unconditionally since adding a held role is a no-op on Discord; a
/// revoke is only sent when the member currently holds the role. At most one
/// mutating call is made and no error escapes: every failure is logged and
/// reported in the outcome.
pub async fn apply_role(
    platform: &dyn PlatformApi,
    guild_id: u64,
    user_id: u64,
    role_id: u64,
    direction: Direction,
) -> MutationOutcome {
    let member = match platform.fetch_member(guild_id, user_id).await {
        Ok(member) => member,
        Err(e) => {
            log_event_failure(
                &format!("Could not fetch member {} in guild {}", user_id, guild_id),
                &e,
            );
            return MutationOutcome::MemberUnavailable(e);
        }
    };

    if member.is_bot {
        debug!(guild_id, user_id, "Ignoring reaction from bot member");
        return MutationOutcome::IgnoredBot;
    }

    match direction {
        Direction::Grant => match platform.add_member_role(guild_id, user_id, role_id).await {
            Ok(()) => {
                info!(guild_id, user_id, role_id, "Granted reaction role");
                MutationOutcome::Granted
            }
            Err(e) => {
                log_event_failure(
                    &format!("Failed to add role {} to user {}", role_id, user_id),
                    &e,
                );
                MutationOutcome::Failed(e)
            }
        },
        Direction::Revoke => {
            if !member.has_role(role_id) {
                info!(
                    guild_id,
                    user_id, role_id, "Member does not hold role, nothing to revoke"
                );
                return MutationOutcome::NotHeld;
            }
            match platform.remove_member_role(guild_id, user_id, role_id).await {
                Ok(()) => {
                    info!(guild_id, user_id, role_id, "Revoked reaction role");
                    MutationOutcome::Revoked
                }
                Err(e) => {
                    log_event_failure(
                        &format!("Failed to remove role {} from user {}", role_id, user_id),
                        &e,
                    );
                    MutationOutcome::Failed(e)
                }
            }
        }
    }
}
