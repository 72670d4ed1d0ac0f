//! The reaction-role service behind the gateway handler.
//!
//! Owns the platform client and the store and turns typed gateway events into
//! role mutations and command replies.

#[path = "bot_tests.rs"]
mod bot_tests;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reaction_store::AssociationStore;
use reaction_types::{key_from_event, IncomingMessage, ReactionEvent};
use serenity::prelude::TypeMapKey;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::commands::CommandHandler;
use crate::errors::log_command_failure;
use crate::mutator::{apply_role, MutationOutcome};
use crate::platform::PlatformApi;
use crate::resolver::resolve;

pub struct RoleBot {
    platform: Arc<dyn PlatformApi>,
    store: Arc<dyn AssociationStore>,
    commands: CommandHandler,
    /// 0 until the gateway reports ready.
    bot_user_id: AtomicU64,
}

impl TypeMapKey for RoleBot {
    type Value = Arc<RoleBot>;
}

impl RoleBot {
    pub fn new(
        platform: Arc<dyn PlatformApi>,
        store: Arc<dyn AssociationStore>,
        prefix: impl Into<String>,
    ) -> Self {
        let commands = CommandHandler::new(platform.clone(), store.clone(), prefix);
        Self {
            platform,
            store,
            commands,
            bot_user_id: AtomicU64::new(0),
        }
    }

    pub fn command_prefix(&self) -> &str {
        self.commands.prefix()
    }

    pub fn set_bot_user_id(&self, user_id: u64) {
        self.bot_user_id.store(user_id, Ordering::Relaxed);
    }

    pub fn bot_user_id(&self) -> Option<u64> {
        match self.bot_user_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    /// Resolve a reaction and, when it targets a role, spawn the role change.
    ///
    /// Returns the spawned task, or `None` when the event is not actionable.
    /// Nothing is done before the bot knows its own user id.
    pub fn handle_reaction(&self, event: ReactionEvent) -> Option<JoinHandle<MutationOutcome>> {
        let Some(self_id) = self.bot_user_id() else {
            warn!("Reaction received before ready, ignoring");
            return None;
        };

        let key = key_from_event(&event.emoji);
        let config = self.store.configured_message(event.guild_id);
        let role_id = resolve(&*self.store, config.as_ref(), &key, self_id, &event)?;

        debug!(
            guild_id = event.guild_id,
            user_id = event.user_id,
            role_id,
            emoji = %key,
            "Reaction {:?} resolved",
            event.kind
        );

        let platform = self.platform.clone();
        Some(tokio::spawn(async move {
            apply_role(
                &*platform,
                event.guild_id,
                event.user_id,
                role_id,
                event.kind.into(),
            )
            .await
        }))
    }

    /// Run a command and post its reply. Bot authors are ignored.
    pub async fn handle_message(&self, msg: &IncomingMessage) {
        if msg.author_is_bot {
            return;
        }
        let Some(reply) = self.commands.handle(msg).await else {
            return;
        };
        if let Err(e) = self
            .platform
            .reply(msg.channel_id, msg.message_id, &reply)
            .await
        {
            log_command_failure(
                &format!("Failed to reply to message {}", msg.message_id),
                &e,
            );
        }
    }
}
