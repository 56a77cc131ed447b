//! Connect Strategy - Connection negotiation for realtime messaging clients.
//!
//! This library turns a declarative program of transport definitions and
//! combinator expressions into an executable strategy tree that negotiates
//! a working bidirectional connection, tolerating unavailable transports,
//! slow negotiation and transient failures.
//!
//! # Architecture
//!
//! ```text
//! Program ──► StrategyBuilder ──► Strategy tree ──► attempt(ctx) ──► Connection
//!   (JSON)      (+ registry)       (Arc nodes)       (PendingAttempt)
//! ```
//!
//! Key design principles:
//!
//! - Programs are data: `[":def_transport", ...]` and `[":def", ...]` lists
//! - Strategy nodes are immutable once built and shared via [`Arc`](std::sync::Arc)
//! - Cancellation is dropping a future; every in-flight child goes with it
//! - Races run inside one task, no extra spawns
//!
//! # Quick Start
//!
//! ```no_run
//! use connect_strategy::{BuildOptions, Program, Result, build};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let program = Program::from_json(r#"[
//!         [":def", "timeouts", {"loop": true, "timeout": 15000, "timeoutLimit": 60000}],
//!         [":def_transport", "ws", "ws", 3, {"host": "ws.example.com"}],
//!         [":def_transport", "sockjs", "sockjs", 1, {"host": "sockjs.example.com"}],
//!         [":def", "ws_loop", [":sequential", ":timeouts", ":ws"]],
//!         [":def", "sockjs_loop", [":sequential", ":timeouts", ":sockjs"]],
//!         [":def", "strategy", [":cached", 1800000,
//!             [":first_connected", ":ws_loop", [":delayed", 2000, ":sockjs_loop"]]]]
//!     ]"#)?;
//!
//!     let options = BuildOptions::new().with_key("app-key").with_encrypted(true);
//!     let strategy = build(&program, &options)?;
//!
//!     let connection = strategy.attempt(options.connect_context()).await?;
//!     println!("Connected via {} in {:?}", connection.transport(), connection.latency());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`builder`] | Program interpreter and build options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`program`] | Instruction and expression AST |
//! | [`strategy`] | Strategy nodes, attempts and the transport cache |
//! | [`transport`] | Transport trait, registry and built-in transports |

// ============================================================================
// Modules
// ============================================================================

/// Program interpreter.
///
/// Use [`StrategyBuilder`] or [`build`] to turn a [`Program`] into a
/// [`Strategy`].
pub mod builder;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for attempts and connections.
pub mod identifiers;

/// Program AST and its JSON wire format.
pub mod program;

/// Strategy tree nodes.
///
/// - [`Strategy`] - Node enum with `connect` and `attempt`
/// - [`PendingAttempt`] - Spawned, cancellable attempt
/// - [`Connection`] - Successful attempt result
pub mod strategy;

/// Transport abstraction.
///
/// Built-in `ws` and `sockjs` transports plus the registry that maps type
/// tags to implementations.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Builder types
pub use builder::{BuildOptions, StrategyBuilder, build};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{AttemptId, ConnectionId};

// Program types
pub use program::{Expression, Instruction, Literal, Program};

// Strategy types
pub use strategy::{
    CacheRecord, ConnectContext, Connection, PendingAttempt, SequentialOptions, Strategy,
    TransportCache,
};

// Transport types
pub use transport::{OpenRequest, Socket, Transport, TransportRegistry};
