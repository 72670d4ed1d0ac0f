//! Shared types for the reaction-roles bot

pub mod emoji;
pub mod errors;
pub mod events;
pub mod link;
pub mod types;

pub use emoji::{key_from_event, key_from_user_text, wire_from_user_text, EmojiParseError};
pub use errors::{ApiErrorCode, PlatformError};
pub use events::{IncomingMessage, ReactionEvent, ReactionKind};
pub use link::{parse_message_link, LinkError, MessageLink};
pub use types::*;
