//! Discord-specific error handling for the bot.
//!
//! Converts serenity errors into typed [`PlatformError`]s at the platform
//! boundary and provides helpers that log a failure at the level its kind
//! deserves.

use reaction_types::{ApiErrorCode, PlatformError};
use serenity::http::HttpError;
use tracing::{debug, error, warn};

/// Classify a serenity `Error` into a [`PlatformError`].
pub fn classify(err: &serenity::Error) -> PlatformError {
    match err {
        serenity::Error::Http(http_err) => classify_http(http_err),
        _ => {
            debug!("Non-HTTP serenity error: {}", err);
            PlatformError::Transport(err.to_string())
        }
    }
}

fn classify_http(http_err: &HttpError) -> PlatformError {
    match http_err {
        HttpError::UnsuccessfulRequest(resp) => classify_response(
            resp.status_code.as_u16(),
            resp.error.code as u32,
            &resp.error.message,
        ),
        _ => {
            debug!("Network-level HTTP error: {}", http_err);
            PlatformError::Transport(http_err.to_string())
        }
    }
}

/// Classify an unsuccessful Discord response from its HTTP status and JSON
/// error code.
pub(crate) fn classify_response(status: u16, raw_code: u32, message: &str) -> PlatformError {
    if status == 429 {
        return PlatformError::RateLimited {
            retry_after_secs: None,
        };
    }
    ApiErrorCode::from_raw(raw_code).into_platform_error(status, message)
}

/// Log a failure of an event-driven side effect. Nobody can be told about
/// these, so permanent failures are only warnings.
pub fn log_event_failure(context: &str, err: &PlatformError) {
    match err {
        PlatformError::RateLimited { retry_after_secs } => {
            warn!("{}: rate limited (retry after {:?}s)", context, retry_after_secs);
        }
        _ => warn!("{}: {}", context, err),
    }
}

/// Log a failure that happened while serving a command.
pub fn log_command_failure(context: &str, err: &PlatformError) {
    if err.is_permanent() {
        error!("{}: {}", context, err);
    } else {
        warn!("{}: {}", context, err);
    }
}
