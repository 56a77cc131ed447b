//! Strategy builder.
//!
//! Interprets a [`Program`](crate::Program) into a [`Strategy`](crate::Strategy)
//! tree.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StrategyBuilder`] | Program interpreter over a transport registry |
//! | [`BuildOptions`] | Per-build flags and transport filters |
//! | [`Evaluator`] | Expression evaluator |
//! | [`Environment`] | Name bindings for one build |
//! | [`Combinator`] | Invocation tag table |
//! | [`Value`] | Evaluated value |
//!
//! # Example
//!
//! ```no_run
//! use connect_strategy::{BuildOptions, Program, build};
//!
//! # fn example() -> connect_strategy::Result<()> {
//! let program = Program::from_json(r#"[
//!     [":def", "timeouts", {"loop": true, "timeout": 15000, "timeoutLimit": 60000}],
//!     [":def_transport", "ws", "ws", 3],
//!     [":def_transport", "sockjs", "sockjs", 1],
//!     [":def", "strategy", [":sequential", ":timeouts", ":ws", ":sockjs"]]
//! ]"#)?;
//!
//! let strategy = build(&program, &BuildOptions::default())?;
//! assert_eq!(strategy.kind_name(), "sequential");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Combinator table.
pub mod combinator;

/// Program interpreter.
pub mod core;

/// Build environment.
pub mod environment;

/// Expression evaluator.
pub mod evaluator;

/// Build options.
pub mod options;

/// Evaluated values.
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use combinator::Combinator;
pub use core::{STRATEGY_BINDING, StrategyBuilder, build};
pub use environment::Environment;
pub use evaluator::Evaluator;
pub use options::BuildOptions;
pub use value::Value;
