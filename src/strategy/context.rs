//! Per-attempt connection context.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// ConnectContext
// ============================================================================

/// Runtime flags passed to every leaf of an attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectContext {
    /// Whether the connection must be encrypted.
    pub encrypted: bool,

    /// Transports with a lower priority fail without opening.
    pub min_priority: i64,
}

impl ConnectContext {
    /// Creates a context with default flags.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            encrypted: false,
            min_priority: 0,
        }
    }

    /// Sets the encryption flag.
    #[inline]
    #[must_use]
    pub const fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Sets the minimum transport priority.
    #[inline]
    #[must_use]
    pub const fn with_min_priority(mut self, min_priority: i64) -> Self {
        self.min_priority = min_priority;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
