//! In-memory store for unit testing without touching the filesystem.

use std::sync::{Arc, Mutex};

use reaction_types::{EmojiKey, GuildConfig, RoleAssociation};

use crate::error::{Result, StoreError};
use crate::json::Tables;
use crate::store::AssociationStore;

/// Non-persistent [`AssociationStore`] with the same upsert/delete semantics
/// as [`crate::JsonStore`].
///
/// Clones share the same tables, so a test can keep a handle while the code
/// under test owns another. [`MemoryStore::fail_writes`] makes every mutation
/// return an error.
///
/// # Example
/// ```rust,ignore
/// let store = MemoryStore::new();
/// store.set_role_association(1, 55, &EmojiKey::new(":star:")).unwrap();
/// assert_eq!(store.associations(1).len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent mutations fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Snapshot of all associations for `guild_id`.
    pub fn associations(&self, guild_id: u64) -> Vec<RoleAssociation> {
        self.tables.lock().unwrap().role_associations(guild_id)
    }

    fn write<T>(&self, change: impl FnOnce(&mut Tables) -> T) -> Result<T> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Io {
                path: "memory".to_string(),
                source: std::io::Error::other("writes disabled"),
            });
        }
        Ok(change(&mut self.tables.lock().unwrap()))
    }
}

impl AssociationStore for MemoryStore {
    fn role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Option<u64> {
        self.tables.lock().unwrap().role_association(guild_id, emoji)
    }

    fn set_role_association(&self, guild_id: u64, role_id: u64, emoji: &EmojiKey) -> Result<()> {
        self.write(|t| t.set_role_association(guild_id, role_id, emoji))
    }

    fn delete_role_association(&self, guild_id: u64, emoji: &EmojiKey) -> Result<bool> {
        self.write(|t| t.delete_role_association(guild_id, emoji))
    }

    fn configured_message(&self, guild_id: u64) -> Option<GuildConfig> {
        self.tables.lock().unwrap().configured_message(guild_id)
    }

    fn set_configured_message(&self, config: GuildConfig) -> Result<()> {
        self.write(|t| t.set_configured_message(config))
    }

    fn delete_configured_message(&self, guild_id: u64) -> Result<bool> {
        self.write(|t| t.delete_configured_message(guild_id))
    }
}
