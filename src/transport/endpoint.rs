//! Host and path resolution from transport options.
//!
//! Recognised option keys:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `hostEncrypted` | `host:port` used when encrypted |
//! | `hostUnencrypted` | `host:port` used when not encrypted |
//! | `host` | Fallback for both |
//! | `path` | Overrides the application path |
//! | `httpPath` | SockJS prefix (default `/pusher`) |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value as JsonValue};
use url::Url;

use crate::error::{Error, Result};

use super::OpenRequest;

// ============================================================================
// Constants
// ============================================================================

/// Protocol revision sent in the application path query.
pub const PROTOCOL_VERSION: u32 = 7;

/// Default SockJS prefix.
pub const DEFAULT_HTTP_PATH: &str = "/pusher";

// ============================================================================
// Resolution
// ============================================================================

fn option_str<'a>(options: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    options.get(key).and_then(JsonValue::as_str)
}

/// Returns the `host[:port]` for the requested encryption mode.
///
/// # Errors
///
/// Returns [`Error::Connection`] if no host option is present.
pub fn host(request: &OpenRequest) -> Result<&str> {
    let specific = if request.encrypted {
        "hostEncrypted"
    } else {
        "hostUnencrypted"
    };

    option_str(&request.options, specific)
        .or_else(|| option_str(&request.options, "host"))
        .ok_or_else(|| Error::connection(format!("transport {} has no host option", request.name)))
}

/// Returns the application path with its query string.
#[must_use]
pub fn app_path(request: &OpenRequest) -> String {
    if let Some(path) = option_str(&request.options, "path") {
        return path.to_string();
    }

    let key = request.key.as_deref().unwrap_or_default();
    format!("/app/{key}?protocol={PROTOCOL_VERSION}")
}

/// Returns the SockJS prefix.
#[must_use]
pub fn http_path(request: &OpenRequest) -> &str {
    option_str(&request.options, "httpPath").unwrap_or(DEFAULT_HTTP_PATH)
}

/// Builds a WebSocket URL for `path` on the request's host.
///
/// # Errors
///
/// - [`Error::Connection`] if no host option is present
/// - [`Error::Url`] if the result does not parse
pub fn ws_url(request: &OpenRequest, path: &str) -> Result<Url> {
    let scheme = if request.encrypted { "wss" } else { "ws" };
    let host = host(request)?;
    Ok(Url::parse(&format!("{scheme}://{host}{path}"))?)
}

// ============================================================================
// Tests
// ============================================================================
