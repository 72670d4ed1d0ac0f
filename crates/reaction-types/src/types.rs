//! Core domain types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrator permission bit in a role's permission bitmask.
pub const ADMINISTRATOR: u64 = 0x8;

/// The single message per guild whose reactions are monitored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

/// "Reacting with this emoji on the configured message grants this role."
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoleAssociation {
    pub guild_id: u64,
    pub role_id: u64,
    pub emoji: EmojiKey,
}

/// Normalized emoji used for storage lookups.
///
/// Custom emoji become `:<name>:` (the id is not part of the key), unicode
/// emoji become their `:<cldr_name>:` text form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EmojiKey(String);

impl EmojiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmojiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Emoji in the form the reaction-add API expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEmoji {
    /// Literal unicode glyph (or whatever text the user gave when it is not a
    /// known shortcode).
    Unicode(String),
    /// Platform-specific emoji, sent as `name:id`.
    Custom { name: String, id: u64 },
}

impl fmt::Display for WireEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(glyph) => f.write_str(glyph),
            Self::Custom { name, id } => write!(f, "{}:{}", name, id),
        }
    }
}

/// Emoji as delivered by a gateway reaction payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEmoji {
    /// Present only for custom emoji.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Custom emoji name or the unicode glyph itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawEmoji {
    pub fn unicode(glyph: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(glyph.into()),
        }
    }

    pub fn custom(name: impl Into<String>, id: u64) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

/// Live view of a guild member, as fetched from the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: u64,
    pub is_bot: bool,
    pub roles: Vec<u64>,
}

impl MemberSnapshot {
    pub fn has_role(&self, role_id: u64) -> bool {
        self.roles.contains(&role_id)
    }
}

/// A guild role and its permission bitmask.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildRole {
    pub id: u64,
    pub permissions: u64,
}

impl GuildRole {
    pub fn is_administrator(&self) -> bool {
        self.permissions & ADMINISTRATOR != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_key_serializes_as_plain_string() {
        let key = EmojiKey::new(":star:");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\":star:\"");
        let back: EmojiKey = serde_json::from_str("\":star:\"").unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_wire_emoji_display() {
        assert_eq!(WireEmoji::Unicode("🎉".to_string()).to_string(), "🎉");
        assert_eq!(
            WireEmoji::Custom {
                name: "star".to_string(),
                id: 555
            }
            .to_string(),
            "star:555"
        );
    }

    #[test]
    fn test_guild_role_administrator_bit() {
        assert!(GuildRole { id: 1, permissions: 0x8 }.is_administrator());
        assert!(GuildRole {
            id: 1,
            permissions: 0x8 | 0x400
        }
        .is_administrator());
        assert!(!GuildRole {
            id: 1,
            permissions: 0x400
        }
        .is_administrator());
    }

    #[test]
    fn test_member_has_role() {
        let member = MemberSnapshot {
            user_id: 42,
            is_bot: false,
            roles: vec![1, 55],
        };
        assert!(member.has_role(55));
        assert!(!member.has_role(56));
    }

    #[test]
    fn test_raw_emoji_constructors() {
        assert_eq!(RawEmoji::unicode("⭐").id, None);
        let custom = RawEmoji::custom("star", 555);
        assert_eq!(custom.id, Some(555));
        assert_eq!(custom.name.as_deref(), Some("star"));
    }
}
