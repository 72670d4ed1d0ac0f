//! Emoji normalization.
//!
//! An emoji reaches the bot in three shapes: a gateway reaction payload, free
//! text typed by an administrator, and the parameter of the reaction-add API.
//! Lookups use a single [`EmojiKey`] form, while API calls need a
//! [`WireEmoji`]:
//!
//! | Input | Key | Wire |
//! |-------|-----|------|
//! | custom `<:star:555>` | `:star:` | `star:555` |
//! | unicode `🎉` | `:party_popper:` | `🎉` |
//! | shortcode `:tada:` | `:party_popper:` | `🎉` |

use std::collections::HashMap;
use std::sync::LazyLock;

use emojis::Emoji;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::types::{EmojiKey, RawEmoji, WireEmoji};

/// Custom emoji mention, `<:name:id>` or `<a:name:id>` for animated ones.
static CUSTOM_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a?:(\w+):(\d+)>").expect("custom emoji pattern"));

/// `:name:` shortcode. Keycap names keep their `#` / `*`.
static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([\w+\-#*]+):").expect("shortcode pattern"));

/// Text name (see [`text_name`]) → emoji, including skin tone variants.
static NAME_INDEX: LazyLock<HashMap<String, &'static Emoji>> = LazyLock::new(|| {
    let mut index = HashMap::new();
    for emoji in emojis::iter() {
        index.entry(text_name(emoji)).or_insert(emoji);
        if let Some(tones) = emoji.skin_tones() {
            for toned in tones {
                index.entry(text_name(toned)).or_insert(toned);
            }
        }
    }
    index
});

const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Longest emoji sequence (ZWJ families, tagged flags) in code points.
const MAX_EMOJI_CHARS: usize = 12;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmojiParseError {
    #[error("no emoji given")]
    Empty,

    #[error("custom emoji id out of range: {0}")]
    InvalidId(String),
}

/// Key for the emoji of a gateway reaction.
///
/// Custom emoji (those with an id) become `:<name>:` whatever their id is.
pub fn key_from_event(raw: &RawEmoji) -> EmojiKey {
    let name = raw.name.as_deref().unwrap_or_default();
    match raw.id {
        Some(_) => EmojiKey::new(format!(":{}:", name)),
        None => EmojiKey::new(normalize(name)),
    }
}

/// Key for emoji text typed by a user.
///
/// A custom emoji mention anywhere in `text` wins; otherwise the first
/// whitespace-delimited token is normalized.
pub fn key_from_user_text(text: &str) -> Result<EmojiKey, EmojiParseError> {
    if let Some(caps) = CUSTOM_EMOJI.captures(text) {
        return Ok(EmojiKey::new(format!(":{}:", &caps[1])));
    }
    let token = text
        .split_whitespace()
        .next()
        .ok_or(EmojiParseError::Empty)?;
    Ok(EmojiKey::new(normalize(token)))
}

/// Form of user emoji text accepted by the reaction-add API.
pub fn wire_from_user_text(text: &str) -> Result<WireEmoji, EmojiParseError> {
    if let Some(caps) = CUSTOM_EMOJI.captures(text) {
        let id = caps[2]
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| EmojiParseError::InvalidId(caps[2].to_string()))?;
        return Ok(WireEmoji::Custom {
            name: caps[1].to_string(),
            id,
        });
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EmojiParseError::Empty);
    }
    Ok(WireEmoji::Unicode(emojize(trimmed)))
}

/// Collapse glyphs and shortcodes of the same emoji to one text form.
fn normalize(text: &str) -> String {
    demojize(&emojize(text))
}

/// Replace every emoji in `text` with `:<name>:`.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        match longest_emoji_prefix(rest) {
            Some((emoji, mut len)) => {
                if rest[len..].starts_with(VARIATION_SELECTOR) {
                    len += VARIATION_SELECTOR.len_utf8();
                }
                out.push(':');
                out.push_str(&text_name(emoji));
                out.push(':');
                rest = &rest[len..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    out
}

/// Replace every known `:<name>:` in `text` with its glyph.
pub fn emojize(text: &str) -> String {
    SHORTCODE
        .replace_all(text, |caps: &Captures| match lookup_name(&caps[1]) {
            Some(emoji) => emoji.as_str().to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn lookup_name(name: &str) -> Option<&'static Emoji> {
    NAME_INDEX
        .get(name)
        .copied()
        .or_else(|| emojis::get_by_shortcode(name))
}

fn longest_emoji_prefix(text: &str) -> Option<(&'static Emoji, usize)> {
    let mut best = None;
    let mut qualified = String::new();
    for (idx, ch) in text.char_indices().take(MAX_EMOJI_CHARS) {
        let end = idx + ch.len_utf8();
        let candidate = &text[..end];
        if let Some(emoji) = emojis::get(candidate) {
            best = Some((emoji, end));
            continue;
        }
        // Bare glyphs such as U+2764 are listed in their fully-qualified form.
        if ch != VARIATION_SELECTOR {
            qualified.clear();
            qualified.push_str(candidate);
            qualified.push(VARIATION_SELECTOR);
            if let Some(emoji) = emojis::get(&qualified) {
                best = Some((emoji, end));
            }
        }
    }
    best
}

/// CLDR name with spaces as `_` and punctuation dropped: "thumbs up" →
/// "thumbs_up", "flag: Japan" → "flag_Japan".
fn text_name(emoji: &Emoji) -> String {
    emoji
        .name()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || matches!(c, '_' | '-' | '#' | '*') => Some(c),
            _ => None,
        })
        .collect()
}
