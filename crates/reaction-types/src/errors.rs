//! Platform API error taxonomy.
//!
//! Every failed platform call is classified into a [`PlatformError`] so call
//! sites can match on the kind of failure instead of inspecting transport
//! errors. [`ApiErrorCode`] maps the raw Discord JSON error codes that matter
//! to role and reaction operations.

use thiserror::Error;

/// Typed failure of a platform API call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// Guild, member, role, channel or message does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The bot lacks access or permissions for the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Global or per-route rate limit hit.
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Network, gateway or any other unclassified failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    /// True for failures that will not go away on their own.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Forbidden(_))
    }
}

/// Discord JSON error codes relevant to role and reaction operations.
///
/// See <https://discord.com/developers/docs/topics/opcodes-and-status-codes#json>.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// 10003
    UnknownChannel,
    /// 10004
    UnknownGuild,
    /// 10007
    UnknownMember,
    /// 10008
    UnknownMessage,
    /// 10011
    UnknownRole,
    /// 10013
    UnknownUser,
    /// 10014
    UnknownEmoji,
    /// 50001
    MissingAccess,
    /// 50013
    MissingPermissions,
    /// 30010
    MaxReactionsReached,
    /// 90001
    ReactionBlocked,
    /// 130000
    ApiOverloaded,
    Unknown,
}

impl ApiErrorCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            10003 => Self::UnknownChannel,
            10004 => Self::UnknownGuild,
            10007 => Self::UnknownMember,
            10008 => Self::UnknownMessage,
            10011 => Self::UnknownRole,
            10013 => Self::UnknownUser,
            10014 => Self::UnknownEmoji,
            30010 => Self::MaxReactionsReached,
            50001 => Self::MissingAccess,
            50013 => Self::MissingPermissions,
            90001 => Self::ReactionBlocked,
            130000 => Self::ApiOverloaded,
            _ => Self::Unknown,
        }
    }

    /// Build the typed error for this code, falling back to the HTTP status
    /// when the JSON code is not one we know.
    pub fn into_platform_error(self, http_status: u16, message: &str) -> PlatformError {
        let message = message.to_string();
        match self {
            Self::UnknownChannel
            | Self::UnknownGuild
            | Self::UnknownMember
            | Self::UnknownMessage
            | Self::UnknownRole
            | Self::UnknownUser
            | Self::UnknownEmoji => PlatformError::NotFound(message),

            Self::MissingAccess
            | Self::MissingPermissions
            | Self::MaxReactionsReached
            | Self::ReactionBlocked => PlatformError::Forbidden(message),

            Self::ApiOverloaded => PlatformError::Transport(message),

            Self::Unknown => match http_status {
                404 => PlatformError::NotFound(message),
                401 | 403 => PlatformError::Forbidden(message),
                429 => PlatformError::RateLimited {
                    retry_after_secs: None,
                },
                _ => PlatformError::Transport(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_known_codes() {
        assert_eq!(ApiErrorCode::from_raw(10007), ApiErrorCode::UnknownMember);
        assert_eq!(ApiErrorCode::from_raw(10011), ApiErrorCode::UnknownRole);
        assert_eq!(ApiErrorCode::from_raw(10014), ApiErrorCode::UnknownEmoji);
        assert_eq!(
            ApiErrorCode::from_raw(50013),
            ApiErrorCode::MissingPermissions
        );
        assert_eq!(ApiErrorCode::from_raw(130000), ApiErrorCode::ApiOverloaded);
    }

    #[test]
    fn test_from_raw_unknown_falls_through() {
        assert_eq!(ApiErrorCode::from_raw(99999), ApiErrorCode::Unknown);
        assert_eq!(ApiErrorCode::from_raw(0), ApiErrorCode::Unknown);
    }

    #[test]
    fn test_not_found_codes() {
        for code in [10003, 10004, 10007, 10008, 10011, 10013, 10014] {
            let err = ApiErrorCode::from_raw(code).into_platform_error(404, "Unknown");
            assert!(
                matches!(err, PlatformError::NotFound(_)),
                "{} should be NotFound, got {:?}",
                code,
                err
            );
        }
    }

    #[test]
    fn test_permission_codes() {
        for code in [50001, 50013, 30010, 90001] {
            let err = ApiErrorCode::from_raw(code).into_platform_error(403, "Missing");
            assert!(
                matches!(err, PlatformError::Forbidden(_)),
                "{} should be Forbidden, got {:?}",
                code,
                err
            );
        }
    }

    #[test]
    fn test_unknown_code_uses_http_status() {
        let unknown = ApiErrorCode::Unknown;
        assert!(matches!(
            unknown.into_platform_error(404, "x"),
            PlatformError::NotFound(_)
        ));
        assert!(matches!(
            unknown.into_platform_error(403, "x"),
            PlatformError::Forbidden(_)
        ));
        assert_eq!(
            unknown.into_platform_error(429, "x"),
            PlatformError::RateLimited {
                retry_after_secs: None
            }
        );
        assert!(matches!(
            unknown.into_platform_error(502, "x"),
            PlatformError::Transport(_)
        ));
    }

    #[test]
    fn test_overloaded_is_transient() {
        let err = ApiErrorCode::ApiOverloaded.into_platform_error(503, "overloaded");
        assert!(matches!(err, PlatformError::Transport(_)));
        assert!(!err.is_permanent());
    }

    #[test]
    fn test_is_permanent() {
        assert!(PlatformError::NotFound("m".into()).is_permanent());
        assert!(PlatformError::Forbidden("m".into()).is_permanent());
        assert!(!PlatformError::Transport("m".into()).is_permanent());
        assert!(!PlatformError::RateLimited {
            retry_after_secs: Some(1)
        }
        .is_permanent());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PlatformError::NotFound("Unknown Member".into()).to_string(),
            "not found: Unknown Member"
        );
        assert_eq!(
            PlatformError::RateLimited {
                retry_after_secs: None
            }
            .to_string(),
            "rate limited"
        );
    }
}
