//! Administrator check for admin commands.

use tracing::warn;

use crate::platform::PlatformApi;

/// Whether `user_id` holds a role carrying the administrator bit in
/// `guild_id`. Both the member and the guild's role table are fetched live.
/// Any failure to read them counts as "not an administrator".
pub async fn is_admin(platform: &dyn PlatformApi, guild_id: u64, user_id: u64) -> bool {
    let (member, roles) = tokio::join!(
        platform.fetch_member(guild_id, user_id),
        platform.guild_roles(guild_id)
    );

    let (member, roles) = match (member, roles) {
        (Ok(member), Ok(roles)) => (member, roles),
        (Err(e), _) | (_, Err(e)) => {
            warn!(guild_id, user_id, "Administrator check failed: {}", e);
            return false;
        }
    };

    roles
        .iter()
        .any(|role| role.is_administrator() && member.has_role(role.id))
}
