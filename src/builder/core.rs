//! Program interpreter.
//!
//! # Example
//!
//! ```no_run
//! use connect_strategy::{BuildOptions, Program, StrategyBuilder};
//!
//! # async fn example() -> connect_strategy::Result<()> {
//! let program = Program::from_json(r#"[
//!     [":def_transport", "ws", "ws", 3, {"host": "ws.example.com"}],
//!     [":def", "strategy", [":cached", 1800000, [":ws"]]]
//! ]"#)?;
//!
//! let options = BuildOptions::new().with_key("app-key").with_encrypted(true);
//! let strategy = StrategyBuilder::default().build(&program, &options)?;
//!
//! let _connection = strategy.attempt(options.connect_context()).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::program::{Expression, Instruction, Program};
use crate::strategy::{Strategy, TransportCache, TransportStrategy, UnsupportedStrategy};
use crate::transport::{Transport, TransportRegistry};

use super::environment::Environment;
use super::evaluator::Evaluator;
use super::options::BuildOptions;
use super::value::Value;

// ============================================================================
// Constants
// ============================================================================

/// Name whose binding is the build result.
pub const STRATEGY_BINDING: &str = "strategy";

// ============================================================================
// StrategyBuilder
// ============================================================================

/// Interprets programs into strategy trees.
///
/// A builder may be reused; each build gets a fresh environment. Cached
/// nodes share the injected cache, or a fresh one per build.
#[derive(Debug, Clone)]
pub struct StrategyBuilder {
    registry: Arc<TransportRegistry>,
    cache: Option<Arc<TransportCache>>,
}

impl Default for StrategyBuilder {
    fn default() -> Self {
        Self::new(TransportRegistry::with_defaults())
    }
}

impl StrategyBuilder {
    /// Creates a builder over `registry`.
    #[must_use]
    pub fn new(registry: impl Into<Arc<TransportRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            cache: None,
        }
    }

    /// Shares `cache` with every cached node this builder creates.
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<TransportCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the transport registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TransportRegistry> {
        &self.registry
    }

    /// Builds the strategy bound to `"strategy"`.
    ///
    /// Transport types are all resolved before any `def` is evaluated, so an
    /// unknown type is reported first.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedTransport`] for an unregistered transport type
    /// - [`Error::UnresolvedSymbol`], [`Error::InvalidOperator`] or
    ///   [`Error::InvalidArgument`] from evaluation
    /// - [`Error::MissingStrategy`] if nothing is bound to `"strategy"`
    pub fn build(&self, program: &Program, options: &BuildOptions) -> Result<Arc<Strategy>> {
        for instruction in program.instructions() {
            if let Instruction::DefTransport { kind, .. } = instruction {
                self.resolve(kind)?;
            }
        }

        let cache = self.cache.clone().unwrap_or_default();
        let mut env = Environment::new();

        for instruction in program.instructions() {
            trace!(name = instruction.name(), "Interpreting instruction");

            match instruction {
                Instruction::DefTransport {
                    name,
                    kind,
                    priority,
                    options: transport_options,
                } => {
                    let transport = self.resolve(kind)?;
                    let transport_options = {
                        let evaluator = Evaluator::new(&env, options, &cache);
                        transport_options_map(&evaluator, transport_options.as_ref())?
                    };
                    let strategy = define_transport(
                        name,
                        kind,
                        *priority,
                        transport,
                        transport_options,
                        options,
                    );
                    env.bind_transport(name, Arc::new(strategy));
                }

                Instruction::Def { name, expr } => {
                    let value = Evaluator::new(&env, options, &cache).evaluate(expr)?;
                    env.bind(name, value);
                }
            }
        }

        let strategy = env
            .take(STRATEGY_BINDING)
            .ok_or(Error::MissingStrategy)?
            .into_strategy(STRATEGY_BINDING)?;

        debug!(
            instructions = program.len(),
            root = strategy.kind_name(),
            "Strategy built"
        );
        Ok(strategy)
    }

    fn resolve(&self, kind: &str) -> Result<Arc<dyn Transport>> {
        self.registry
            .resolve(kind)
            .ok_or_else(|| Error::unsupported_transport(kind))
    }
}

/// Builds `program` with the default registry.
///
/// Only the built-in `ws` and `sockjs` transports are available here. A
/// program that defines any other transport type, such as `xhr_streaming`,
/// fails with [`Error::UnsupportedTransport`]; register an implementation
/// and use [`StrategyBuilder::new`] instead:
///
/// ```ignore
/// let mut registry = TransportRegistry::with_defaults();
/// registry.register("xhr_streaming", Arc::new(MyXhrTransport::new()));
/// let strategy = StrategyBuilder::new(registry).build(&program, &options)?;
/// ```
///
/// # Errors
///
/// See [`StrategyBuilder::build`].
pub fn build(program: &Program, options: &BuildOptions) -> Result<Arc<Strategy>> {
    StrategyBuilder::default().build(program, options)
}

// ============================================================================
// Helpers
// ============================================================================

fn transport_options_map(
    evaluator: &Evaluator<'_>,
    expr: Option<&Expression>,
) -> Result<Map<String, JsonValue>> {
    match expr {
        None => Ok(Map::new()),
        Some(expr) => match evaluator.evaluate(expr)? {
            Value::Null => Ok(Map::new()),
            value => value.into_map("def_transport options"),
        },
    }
}

fn define_transport(
    name: &str,
    kind: &str,
    priority: i64,
    transport: Arc<dyn Transport>,
    transport_options: Map<String, JsonValue>,
    options: &BuildOptions,
) -> Strategy {
    if !options.is_enabled(name) {
        debug!(transport = %name, "Transport disabled by build options");
        return Strategy::Unsupported(UnsupportedStrategy::new(name));
    }

    Strategy::Transport(TransportStrategy::new(
        name,
        kind,
        priority,
        transport,
        transport_options,
        options.key.clone(),
    ))
}

// ============================================================================
// Tests
// ============================================================================
