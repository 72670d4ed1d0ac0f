//! Message link parsing
//!
//! Links look like `https://discord.com/channels/<guild>/<channel>/<message>`.

use thiserror::Error;
use url::Url;

/// Ids extracted from a message link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLink {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("no message link given")]
    Missing,

    #[error("malformed message link: {0}")]
    Malformed(String),
}

/// Parse the last whitespace-delimited token of `text` as a message link.
///
/// Only the path matters: it needs at least five `/`-separated segments with
/// `channels` fourth from the end, followed by three numeric ids. A bare path
/// without scheme or host is accepted too.
pub fn parse_message_link(text: &str) -> Result<MessageLink, LinkError> {
    let token = text.split_whitespace().last().ok_or(LinkError::Missing)?;

    let path = match Url::parse(token) {
        Ok(url) => url.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => token
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(e) => return Err(LinkError::Malformed(e.to_string())),
    };

    let segments: Vec<&str> = path.split('/').collect();
    let n = segments.len();
    if n < 5 || segments[n - 4] != "channels" {
        return Err(LinkError::Malformed(token.to_string()));
    }

    // Snowflakes are never zero.
    let id = |segment: &str| {
        segment
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| LinkError::Malformed(token.to_string()))
    };

    Ok(MessageLink {
        guild_id: id(segments[n - 3])?,
        channel_id: id(segments[n - 2])?,
        message_id: id(segments[n - 1])?,
    })
}
