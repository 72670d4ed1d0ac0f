//! JSON file store.
//!
//! The file holds two tables keyed by numeric document id:
//!
//! ```json
//! {
//!   "roles":   {"1": {"guild_id": 1, "role_id": 55, "emoji": ":star:"}},
//!   "message": {"1": {"guild_id": 1, "channel_id": 10, "configured_message_id": 100}}
//! }
//! ```
//!
//! Both tables are loaded once at open and kept in memory. Every mutation
//! rewrites the whole file through a temporary file and a rename, and only
//! becomes visible to readers once the write succeeded. Any other top-level
//! table in the file (TinyDB's `_default`, for one) is written back as read.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[cfg(any(test, feature = "test-support"))]
use reaction_types::RoleAssociation;
use reaction_types::{EmojiKey, GuildConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::AssociationStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct RoleRecord {
    guild_id: u64,
    role_id: u64,
    emoji: EmojiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct MessageRecord {
    guild_id: u64,
    channel_id: u64,
    configured_message_id: u64,
}

const ROLES_TABLE: &str = "roles";
const MESSAGE_TABLE: &str = "message";

/// In-memory image of the database file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    roles: BTreeMap<u64, RoleRecord>,
    message: BTreeMap<u64, MessageRecord>,
    other: Map<String, Value>,
}

fn next_id<V>(table: &BTreeMap<u64, V>) -> u64 {
    table.keys().next_back().map_or(1, |last| last + 1)
}

fn table<T: DeserializeOwned + Default>(value: Option<Value>) -> Result<T> {
    Ok(value.map(serde_json::from_value).transpose()?.unwrap_or_default())
}

impl Tables {
    fn from_json(content: &str) -> Result<Self> {
        let mut other: Map<String, Value> = serde_json::from_str(content)?;
        Ok(Self {
            roles: table(other.remove(ROLES_TABLE))?,
            message: table(other.remove(MESSAGE_TABLE))?,
            other,
        })
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        let mut document = self.other.clone();
        document.insert(ROLES_TABLE.to_string(), serde_json::to_value(&self.roles)?);
        document.insert(MESSAGE_TABLE.to_string(), serde_json::to_value(&self.message)?);
        Ok(serde_json::to_vec(&document)?)
    }

    pub(crate) fn role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Option<u64> {
        self.roles
            .values()
            .find(|r| r.guild_id == guild_id && &r.emoji == emoji)
            .map(|r| r.role_id)
    }

    pub(crate) fn set_role_association(&mut self, guild_id: u64, role_id: u64, emoji: &EmojiKey) {
        let record = RoleRecord {
            guild_id,
            role_id,
            emoji: emoji.clone(),
        };
        let existing = self
            .roles
            .iter()
            .find(|(_, r)| r.guild_id == guild_id && &r.emoji == emoji)
            .map(|(id, _)| *id);
        let id = existing.unwrap_or_else(|| next_id(&self.roles));
        self.roles.insert(id, record);
    }

    pub(crate) fn delete_role_association(&mut self, guild_id: u64, emoji: &EmojiKey) -> bool {
        let before = self.roles.len();
        self.roles
            .retain(|_, r| !(r.guild_id == guild_id && &r.emoji == emoji));
        self.roles.len() != before
    }

    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn role_associations(&self, guild_id: u64) -> Vec<RoleAssociation> {
        self.roles
            .values()
            .filter(|r| r.guild_id == guild_id)
            .map(|r| RoleAssociation {
                guild_id: r.guild_id,
                role_id: r.role_id,
                emoji: r.emoji.clone(),
            })
            .collect()
    }

    pub(crate) fn configured_message(&self, guild_id: u64) -> Option<GuildConfig> {
        self.message
            .values()
            .find(|m| m.guild_id == guild_id)
            .map(|m| GuildConfig {
                guild_id: m.guild_id,
                channel_id: m.channel_id,
                message_id: m.configured_message_id,
            })
    }

    pub(crate) fn set_configured_message(&mut self, config: GuildConfig) {
        let record = MessageRecord {
            guild_id: config.guild_id,
            channel_id: config.channel_id,
            configured_message_id: config.message_id,
        };
        let existing = self
            .message
            .iter()
            .find(|(_, m)| m.guild_id == config.guild_id)
            .map(|(id, _)| *id);
        let id = existing.unwrap_or_else(|| next_id(&self.message));
        self.message.insert(id, record);
    }

    pub(crate) fn delete_configured_message(&mut self, guild_id: u64) -> bool {
        let before = self.message.len();
        self.message.retain(|_, m| m.guild_id != guild_id);
        self.message.len() != before
    }
}

/// File-backed [`AssociationStore`].
pub struct JsonStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonStore {
    /// Open (or start) the database at `config.path`.
    ///
    /// A missing or empty file yields empty tables; the file is created on the
    /// first write.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = config.path.clone();
        let tables = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Tables::default(),
            Ok(content) => Tables::from_json(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Tables::default(),
            Err(source) => return Err(io_error(&path, source)),
        };

        info!(
            path = %path.display(),
            associations = tables.roles.len(),
            configured_guilds = tables.message.len(),
            "Opened association store"
        );

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Mutations swap in a fully built image, so a poisoned guard still
        // holds consistent tables.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the tables; persist and publish the copy if
    /// `change` reports a modification.
    fn update(&self, change: impl FnOnce(&mut Tables) -> bool) -> Result<bool> {
        let mut guard = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = guard.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        self.persist(&next)?;
        *guard = next;
        Ok(true)
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let payload = tables.to_json()?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = fs::write(&tmp, &payload)
            .map_err(|e| io_error(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e)));
        if let Err(e) = written {
            fs::remove_file(&tmp).ok();
            return Err(e);
        }

        debug!(
            path = %self.path.display(),
            bytes = payload.len(),
            "Persisted association store"
        );
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl AssociationStore for JsonStore {
    fn role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Option<u64> {
        self.read().role_association(guild_id, emoji)
    }

    fn set_role_association(&self, guild_id: u64, role_id: u64, emoji: &EmojiKey) -> Result<()> {
        self.update(|t| {
            t.set_role_association(guild_id, role_id, emoji);
            true
        })?;
        Ok(())
    }

    fn delete_role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Result<bool> {
        self.update(|t| t.delete_role_association(guild_id, emoji))
    }

    fn configured_message(&self, guild_id: u64) -> Option<GuildConfig> {
        self.read().configured_message(guild_id)
    }

    fn set_configured_message(&self, config: GuildConfig) -> Result<()> {
        self.update(|t| {
            t.set_configured_message(config);
            true
        })?;
        Ok(())
    }

    fn delete_configured_message(&self, guild_id: u64) -> Result<bool> {
        self.update(|t| t.delete_configured_message(guild_id))
    }
}
