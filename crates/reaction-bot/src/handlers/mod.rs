//! Serenity event handler implementation

mod convert;

use std::sync::Arc;

use reaction_types::ReactionKind;
use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};

use crate::bot::RoleBot;
use crate::health::AppState;

use self::convert::{incoming_message, reaction_event};

pub struct Handler;

async fn role_bot(ctx: &Context) -> Option<Arc<RoleBot>> {
    let data = ctx.data.read().await;
    let bot = data.get::<RoleBot>().cloned();
    if bot.is_none() {
        error!("RoleBot not found in context data");
    }
    bot
}

impl Handler {
    async fn on_reaction(&self, ctx: Context, kind: ReactionKind, reaction: Reaction) {
        let Some(event) = reaction_event(kind, &reaction) else {
            return;
        };
        if let Some(bot) = role_bot(&ctx).await {
            // The spawned task logs its own outcome.
            let _ = bot.handle_reaction(event);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user_id = ready.user.id.get(),
            guilds = ready.guilds.len(),
            "Connected as {}",
            ready.user.name
        );

        if let Some(bot) = role_bot(&ctx).await {
            bot.set_bot_user_id(ready.user.id.get());
            info!("Listening for commands with prefix {:?}", bot.command_prefix());
        }

        let health = ctx.data.read().await.get::<AppState>().cloned();
        if let Some(state) = health {
            state.set_bot_username(ready.user.name.clone()).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if let Some(bot) = role_bot(&ctx).await {
            bot.handle_message(&incoming_message(&msg)).await;
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        self.on_reaction(ctx, ReactionKind::Add, reaction).await;
    }

    async fn reaction_remove(&self, ctx: Context, reaction: Reaction) {
        self.on_reaction(ctx, ReactionKind::Remove, reaction).await;
    }
}
