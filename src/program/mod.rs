//! Strategy program model.
//!
//! A program is the ordered instruction list consumed by the builder. It is
//! usually written as JSON:
//!
//! ```json
//! [
//!   [":def_transport", "ws", "ws", 3, { "hostEncrypted": "ws.example.com:443" }],
//!   [":def", "timeouts", { "loop": true, "timeout": 15000, "timeoutLimit": 60000 }],
//!   [":def", "strategy", [":sequential", ":timeouts", ":ws"]]
//! ]
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `expression` | Expression AST and literal values |
//! | `instruction` | `def_transport` / `def` instructions and [`Program`] |

// ============================================================================
// Submodules
// ============================================================================

/// Expression AST.
pub mod expression;

/// Instructions and programs.
pub mod instruction;

// ============================================================================
// Re-exports
// ============================================================================

pub use expression::{Expression, Literal};
pub use instruction::{Instruction, Program};

// ============================================================================
// Constants
// ============================================================================

/// Marker prefix of symbols in the wire format.
pub const SYMBOL_MARKER: char = ':';
