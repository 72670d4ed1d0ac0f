//! Admin text commands.
//!
//! Every command except `ping` must be used inside a server by a member
//! holding an administrator role. Handlers return the reply text; user errors
//! are never raised further.

#[path = "commands_tests.rs"]
mod commands_tests;

use std::sync::{Arc, LazyLock};

use reaction_store::AssociationStore;
use reaction_types::{
    key_from_user_text, parse_message_link, wire_from_user_text, GuildConfig, IncomingMessage,
};
use regex::Regex;
use tracing::{debug, error, info};

use crate::errors::log_command_failure;
use crate::permissions::is_admin;
use crate::platform::PlatformApi;

static ROLE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@&(\d+)>").expect("role mention pattern"));

pub const PONG: &str = "Pong!";
pub const NOT_IN_GUILD: &str = "This command can only be used in a server.";
pub const NOT_ADMIN: &str = "You need administrator permissions to use this command.";
pub const INVALID_LINK: &str = "Invalid message link format.";
pub const OTHER_GUILD: &str = "The linked message must be in the same server.";
pub const NO_MESSAGE_CONFIGURED: &str = "No role react message is configured for this server.";
pub const MESSAGE_REMOVED: &str = "Removed the role react message configuration.";
pub const DUPLICATE_EMOJI: &str = "That emoji is already associated with a role in this server.";
pub const UNKNOWN_EMOJI: &str = "That emoji is not associated with any role.";
pub const SAVE_FAILED: &str = "Failed to save the role react configuration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    SetMessage,
    RemoveMessage,
    Add,
    Remove,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Command::Ping),
            "setmessage" => Some(Command::SetMessage),
            "removemessage" => Some(Command::RemoveMessage),
            "add" => Some(Command::Add),
            "remove" => Some(Command::Remove),
            _ => None,
        }
    }
}

/// Split `content` into a known command and its argument text.
///
/// The command name follows the prefix directly and ends at the first
/// whitespace; the arguments are everything after it, trimmed.
pub fn parse_command<'a>(prefix: &str, content: &'a str) -> Option<(Command, &'a str)> {
    let rest = content.strip_prefix(prefix)?;
    let (name, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    Command::from_name(name).map(|command| (command, args.trim()))
}

pub struct CommandHandler {
    platform: Arc<dyn PlatformApi>,
    store: Arc<dyn AssociationStore>,
    prefix: String,
}

impl CommandHandler {
    pub fn new(
        platform: Arc<dyn PlatformApi>,
        store: Arc<dyn AssociationStore>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reply for `msg`, or `None` when it is not a command.
    pub async fn handle(&self, msg: &IncomingMessage) -> Option<String> {
        let (command, args) = parse_command(&self.prefix, &msg.content)?;
        debug!(
            message_id = msg.message_id,
            author_id = msg.author_id,
            "Received {:?} command",
            command
        );

        if command == Command::Ping {
            return Some(PONG.to_string());
        }

        let Some(guild_id) = msg.guild_id else {
            return Some(NOT_IN_GUILD.to_string());
        };
        if !is_admin(&*self.platform, guild_id, msg.author_id).await {
            info!(guild_id, user_id = msg.author_id, "Rejected {:?} from non-admin", command);
            return Some(NOT_ADMIN.to_string());
        }

        let reply = match command {
            Command::SetMessage => self.set_message(guild_id, args),
            Command::RemoveMessage => self.remove_message(guild_id),
            Command::Add => self.add(guild_id, args).await,
            Command::Remove => self.remove(guild_id, args),
            Command::Ping => PONG.to_string(),
        };
        Some(reply)
    }

    fn set_message(&self, guild_id: u64, args: &str) -> String {
        let link = match parse_message_link(args) {
            Ok(link) => link,
            Err(e) => {
                debug!(guild_id, "Rejected message link: {}", e);
                return INVALID_LINK.to_string();
            }
        };
        if link.guild_id != guild_id {
            return OTHER_GUILD.to_string();
        }

        let config = GuildConfig {
            guild_id,
            channel_id: link.channel_id,
            message_id: link.message_id,
        };
        if let Err(e) = self.store.set_configured_message(config) {
            error!(guild_id, "Failed to save role react message: {}", e);
            return SAVE_FAILED.to_string();
        }

        info!(
            guild_id,
            channel_id = link.channel_id,
            message_id = link.message_id,
            "Configured role react message"
        );
        format!(
            "Set role react message to `{}` in <#{}>.",
            link.message_id, link.channel_id
        )
    }

    fn remove_message(&self, guild_id: u64) -> String {
        match self.store.delete_configured_message(guild_id) {
            Ok(true) => {
                info!(guild_id, "Removed role react message");
                MESSAGE_REMOVED.to_string()
            }
            Ok(false) => NO_MESSAGE_CONFIGURED.to_string(),
            Err(e) => {
                error!(guild_id, "Failed to remove role react message: {}", e);
                SAVE_FAILED.to_string()
            }
        }
    }

    async fn add(&self, guild_id: u64, args: &str) -> String {
        let Some(config) = self.store.configured_message(guild_id) else {
            return self.not_configured();
        };

        let Some((role_id, emoji_text)) = split_role_mention(args) else {
            return format!(
                "Please mention a role. Usage: `{}add @Role :emoji:`",
                self.prefix
            );
        };
        let Ok(key) = key_from_user_text(emoji_text) else {
            return format!(
                "Please provide an emoji. Usage: `{}add @Role :emoji:`",
                self.prefix
            );
        };

        if self.store.role_association(guild_id, &key).is_some() {
            return DUPLICATE_EMOJI.to_string();
        }
        if let Err(e) = self.store.set_role_association(guild_id, role_id, &key) {
            error!(guild_id, role_id, "Failed to save role association: {}", e);
            return SAVE_FAILED.to_string();
        }
        info!(guild_id, role_id, emoji = %key, "Added role association");

        let shown = first_token(emoji_text);
        if self.seed_reaction(&config, emoji_text).await {
            format!("Associated {} with <@&{}>.", shown, role_id)
        } else {
            format!(
                "Associated {} with <@&{}>, but failed to add reaction to message.",
                shown, role_id
            )
        }
    }

    /// React to the configured message with the new emoji so members can
    /// click it.
    async fn seed_reaction(&self, config: &GuildConfig, emoji_text: &str) -> bool {
        let wire = match wire_from_user_text(emoji_text) {
            Ok(wire) => wire,
            Err(e) => {
                debug!(guild_id = config.guild_id, "Cannot react with {:?}: {}", emoji_text, e);
                return false;
            }
        };
        match self
            .platform
            .add_reaction(config.channel_id, config.message_id, &wire)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log_command_failure(
                    &format!(
                        "Failed to add reaction {} to message {}",
                        wire, config.message_id
                    ),
                    &e,
                );
                false
            }
        }
    }

    fn remove(&self, guild_id: u64, args: &str) -> String {
        if self.store.configured_message(guild_id).is_none() {
            return self.not_configured();
        }

        let Ok(key) = key_from_user_text(args) else {
            return format!("Usage: `{}remove :emoji:`", self.prefix);
        };

        match self.store.delete_role_association(guild_id, &key) {
            Ok(true) => {
                info!(guild_id, emoji = %key, "Removed role association");
                format!("Removed role association for {}.", first_token(args))
            }
            Ok(false) => UNKNOWN_EMOJI.to_string(),
            Err(e) => {
                error!(guild_id, "Failed to remove role association: {}", e);
                SAVE_FAILED.to_string()
            }
        }
    }

    fn not_configured(&self) -> String {
        format!(
            "No role react message is configured. Use `{}setmessage <message_link>` first.",
            self.prefix
        )
    }
}

/// Role id of the first role mention in `args` and the trimmed text after it.
fn split_role_mention(args: &str) -> Option<(u64, &str)> {
    let caps = ROLE_MENTION.captures(args)?;
    let role_id = caps[1].parse::<u64>().ok().filter(|id| *id != 0)?;
    let end = caps.get(0)?.end();
    Some((role_id, args[end..].trim()))
}

fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or_default()
}
