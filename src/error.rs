//! Error types for the connection-strategy engine.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use connect_strategy::{BuildOptions, Program, Result, build};
//!
//! fn example(json: &str) -> Result<()> {
//!     let program = Program::from_json(json)?;
//!     let strategy = build(&program, &BuildOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Build | [`Error::UnsupportedTransport`], [`Error::UnresolvedSymbol`], [`Error::InvalidOperator`], [`Error::MissingStrategy`], [`Error::InvalidArgument`], [`Error::InvalidProgram`] |
//! | Attempt | [`Error::TransportUnsupported`], [`Error::PriorityTooLow`], [`Error::AllFailed`], [`Error::Cancelled`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::Timeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Build-time variants are raised synchronously by the builder and abort the
/// whole build. Attempt-time variants surface from [`Strategy::connect`] once
/// every fallback in the tree is exhausted.
///
/// [`Strategy::connect`]: crate::strategy::Strategy::connect
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Build Errors
    // ========================================================================
    /// Transport type is not present in the registry.
    ///
    /// Returned by `def_transport` for an unknown type tag.
    #[error("Unsupported transport: {kind}")]
    UnsupportedTransport {
        /// The unknown transport type.
        kind: String,
    },

    /// Expression references a name that is not bound.
    #[error("Undefined symbol :{name}")]
    UnresolvedSymbol {
        /// The missing name (without the `:` marker).
        name: String,
    },

    /// Invocation head is not a combinator.
    #[error("Calling non-function :{tag}")]
    InvalidOperator {
        /// The offending tag (without the `:` marker).
        tag: String,
    },

    /// Program finished without binding `strategy`.
    #[error("Program does not define a strategy")]
    MissingStrategy,

    /// Combinator received an argument of the wrong shape.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Program text does not follow the instruction format.
    #[error("Invalid program: {message}")]
    InvalidProgram {
        /// Description of the malformed instruction.
        message: String,
    },

    // ========================================================================
    // Attempt Errors
    // ========================================================================
    /// Transport reports it cannot run in this environment.
    #[error("Transport {name} is not supported")]
    TransportUnsupported {
        /// Transport definition name.
        name: String,
    },

    /// Transport priority is below the attempt's minimum.
    #[error("Transport {name} priority {priority} is below minimum {min_priority}")]
    PriorityTooLow {
        /// Transport definition name.
        name: String,
        /// The transport's priority.
        priority: i64,
        /// The minimum the attempt required.
        min_priority: i64,
    },

    /// Every sub-strategy failed.
    #[error("All {} strategies failed", failures.len())]
    AllFailed {
        /// Failures in the order the sub-strategies finished.
        failures: Vec<Error>,
    },

    /// Attempt was cancelled before it resolved.
    #[error("Attempt cancelled")]
    Cancelled,

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection handshake did not finish in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an unsupported transport error.
    #[inline]
    pub fn unsupported_transport(kind: impl Into<String>) -> Self {
        Self::UnsupportedTransport { kind: kind.into() }
    }

    /// Creates an unresolved symbol error.
    #[inline]
    pub fn unresolved_symbol(name: impl Into<String>) -> Self {
        Self::UnresolvedSymbol { name: name.into() }
    }

    /// Creates an invalid operator error.
    #[inline]
    pub fn invalid_operator(tag: impl Into<String>) -> Self {
        Self::InvalidOperator { tag: tag.into() }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid program error.
    #[inline]
    pub fn invalid_program(message: impl Into<String>) -> Self {
        Self::InvalidProgram {
            message: message.into(),
        }
    }

    /// Creates a transport unsupported error.
    #[inline]
    pub fn transport_unsupported(name: impl Into<String>) -> Self {
        Self::TransportUnsupported { name: name.into() }
    }

    /// Creates a priority too low error.
    #[inline]
    pub fn priority_too_low(name: impl Into<String>, priority: i64, min_priority: i64) -> Self {
        Self::PriorityTooLow {
            name: name.into(),
            priority,
            min_priority,
        }
    }

    /// Creates an aggregate failure.
    #[inline]
    pub fn all_failed(failures: Vec<Error>) -> Self {
        Self::AllFailed { failures }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error is raised while building a strategy.
    #[inline]
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTransport { .. }
                | Self::UnresolvedSymbol { .. }
                | Self::InvalidOperator { .. }
                | Self::MissingStrategy
                | Self::InvalidArgument { .. }
                | Self::InvalidProgram { .. }
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::Timeout { .. }
        )
    }

    /// Returns `true` if the attempt was cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::WebSocket(_)
                | Self::Io(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
