//! Build options.
//!
//! Options are threaded through a build into the nodes that consult them.
//! They deserialize from camelCase JSON:
//!
//! ```json
//! {
//!   "encrypted": true,
//!   "key": "app-key",
//!   "enabledTransports": ["ws", "sockjs"],
//!   "disabledTransports": ["xhr_polling"]
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::strategy::ConnectContext;

// ============================================================================
// BuildOptions
// ============================================================================

/// Options for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildOptions {
    /// Selects the cache partition and the secure endpoint.
    pub encrypted: bool,

    /// Application key passed to every transport open.
    pub key: Option<String>,

    /// If set, only these transport definitions are enabled.
    pub enabled_transports: Option<Vec<String>>,

    /// Transport definitions to disable.
    pub disabled_transports: Option<Vec<String>>,
}

// ============================================================================
// Constructors
// ============================================================================

impl BuildOptions {
    /// Creates default options.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            encrypted: false,
            key: None,
            enabled_transports: None,
            disabled_transports: None,
        }
    }

    /// Parses options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BuildOptions {
    /// Sets the encrypted flag.
    #[inline]
    #[must_use]
    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Sets the application key.
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Restricts the build to the named transport definitions.
    #[must_use]
    pub fn with_enabled_transports(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.enabled_transports = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Disables the named transport definitions.
    #[must_use]
    pub fn with_disabled_transports(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.disabled_transports = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// Queries
// ============================================================================

impl BuildOptions {
    /// Returns `true` if the transport definition `name` is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        let listed = |names: &Option<Vec<String>>| {
            names
                .as_ref()
                .map(|names| names.iter().any(|n| n == name))
        };

        listed(&self.enabled_transports).unwrap_or(true)
            && !listed(&self.disabled_transports).unwrap_or(false)
    }

    /// Returns the connect context matching these options.
    #[inline]
    #[must_use]
    pub fn connect_context(&self) -> ConnectContext {
        ConnectContext::new().with_encrypted(self.encrypted)
    }
}

// ============================================================================
// Tests
// ============================================================================
