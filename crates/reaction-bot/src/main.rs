//! Reaction roles bot
//!
//! Grants and revokes guild roles when members react to a designated message,
//! and lets administrators manage the emoji → role associations with text
//! commands.

mod bot;
mod commands;
mod config;
mod errors;
#[cfg(test)]
mod fake_platform;
mod handlers;
mod health;
mod mutator;
mod permissions;
mod platform;
mod resolver;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use reaction_store::{JsonStore, StoreConfig};
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::RoleBot;
use crate::config::{CommandConfig, Config, ReadEnv, SystemEnv};
use crate::handlers::Handler;
use crate::health::AppState;
use crate::platform::SerenityPlatform;

/// Reaction roles bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/reaction-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Command prefix (overrides config file)
    #[arg(long, env = "COMMAND_PREFIX")]
    command_prefix: Option<String>,

    /// "default" (`!add`) or "spaced" (`!role add`)
    #[arg(long, env = "PREFIX_TYPE")]
    prefix_type: Option<String>,

    /// Path of the JSON database file (overrides config file)
    #[arg(long, env = "DB_PATH")]
    db_path: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(bot_token) = &self.bot_token {
            config.discord.bot_token = bot_token.clone();
        }
        if self.command_prefix.is_some() || self.prefix_type.is_some() {
            let prefix = self
                .command_prefix
                .clone()
                .unwrap_or_else(|| config.commands.prefix.clone());
            config.commands = match self.prefix_type.as_deref() {
                Some(prefix_type) => CommandConfig::from_raw(Some(prefix), Some(prefix_type)),
                None => CommandConfig {
                    prefix,
                    prefix_type: config.commands.prefix_type,
                },
            };
        }
        if let Some(db_path) = &self.db_path {
            config.store = StoreConfig::new(db_path);
        }
    }
}

/// Config file if present, else the environment; CLI flags win over both.
fn load_config(args: &Args, env: &impl ReadEnv) -> Result<Config> {
    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env_impl(env)?
    };
    args.apply_overrides(&mut config);

    if config.discord.bot_token.is_empty() {
        anyhow::bail!("No Discord bot token configured (set DISCORD_BOT_TOKEN or --bot-token)");
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reaction_bot=debug,reaction_store=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reaction roles bot");

    let args = Args::parse();

    let config = load_config(&args, &SystemEnv)?;

    let prefix = config.commands.command_prefix();
    info!("Command prefix: {:?}", prefix);

    let store = Arc::new(
        JsonStore::open(&config.store)
            .with_context(|| format!("Failed to open store {}", config.store.path.display()))?,
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    let platform = Arc::new(SerenityPlatform::new(client.http.clone()));
    let bot = Arc::new(RoleBot::new(platform, store, prefix));
    let health_state = AppState::new();

    {
        let mut data = client.data.write().await;
        data.insert::<RoleBot>(bot);
        data.insert::<AppState>(health_state.clone());
    }

    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Reaction roles bot stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {}", e),
        }
    }
    tokio::signal::ctrl_c().await.ok();
}
