//! Configuration management for reaction-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::str::FromStr;

use anyhow::{Context, Result};
use reaction_store::StoreConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

const DEFAULT_PREFIX: &str = "!";

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
}

/// How commands are recognised in message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCommandConfig")]
pub struct CommandConfig {
    pub prefix: String,
    pub prefix_type: PrefixType,
}

/// `[commands]` as written in the config file.
#[derive(Deserialize)]
struct RawCommandConfig {
    prefix: Option<String>,
    prefix_type: Option<String>,
}

impl From<RawCommandConfig> for CommandConfig {
    fn from(raw: RawCommandConfig) -> Self {
        CommandConfig::from_raw(raw.prefix, raw.prefix_type.as_deref())
    }
}

/// `default` commands look like `!add`, `spaced` ones like `!role add`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixType {
    #[default]
    Default,
    Spaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown prefix type {0:?}, expected \"default\" or \"spaced\"")]
pub struct UnknownPrefixType(pub String);

impl FromStr for PrefixType {
    type Err = UnknownPrefixType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(PrefixType::Default),
            "spaced" => Ok(PrefixType::Spaced),
            _ => Err(UnknownPrefixType(s.to_string())),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            prefix_type: PrefixType::Default,
        }
    }
}

impl CommandConfig {
    /// Build from raw prefix settings. An unknown prefix type is logged and
    /// the whole setting falls back to the default `!` prefix.
    pub fn from_raw(prefix: Option<String>, prefix_type: Option<&str>) -> Self {
        let prefix = prefix.unwrap_or_else(default_prefix);
        match prefix_type.map(PrefixType::from_str).transpose() {
            Ok(prefix_type) => Self {
                prefix,
                prefix_type: prefix_type.unwrap_or_default(),
            },
            Err(e) => {
                error!("Invalid prefix type: {}; using {:?}", e, DEFAULT_PREFIX);
                Self::default()
            }
        }
    }

    /// Text a message must start with to be read as a command.
    pub fn command_prefix(&self) -> String {
        match self.prefix_type {
            PrefixType::Default => self.prefix.clone(),
            PrefixType::Spaced => format!("{} ", self.prefix),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// A missing token is left empty so a `--bot-token` flag can still supply
    /// it; startup rejects an empty token once all sources are merged.
    pub(crate) fn from_env_impl(env: &impl ReadEnv) -> Result<Self> {
        let bot_token = env.var("DISCORD_BOT_TOKEN").unwrap_or_default();

        let commands = CommandConfig::from_raw(
            env.var("COMMAND_PREFIX"),
            env.var("PREFIX_TYPE").as_deref(),
        );

        let store = env
            .var("DB_PATH")
            .map(StoreConfig::new)
            .unwrap_or_default();

        Ok(Config {
            discord: DiscordBotConfig { bot_token },
            commands,
            store,
        })
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
