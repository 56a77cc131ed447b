//! Expression evaluator.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::program::Expression;
use crate::strategy::TransportCache;

use super::combinator::Combinator;
use super::environment::Environment;
use super::options::BuildOptions;
use super::value::Value;

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluates expressions against a read-only view of the environment.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    env: &'a Environment,
    options: &'a BuildOptions,
    cache: &'a Arc<TransportCache>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    #[inline]
    #[must_use]
    pub fn new(
        env: &'a Environment,
        options: &'a BuildOptions,
        cache: &'a Arc<TransportCache>,
    ) -> Self {
        Self {
            env,
            options,
            cache,
        }
    }

    /// Returns the environment.
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &'a Environment {
        self.env
    }

    /// Returns the build options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &'a BuildOptions {
        self.options
    }

    /// Returns the cache handed to cached nodes.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &'a Arc<TransportCache> {
        self.cache
    }

    /// Evaluates `expr`.
    ///
    /// The invocation tag is resolved before any argument is evaluated.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedSymbol`](crate::Error::UnresolvedSymbol) for an unbound reference
    /// - [`Error::InvalidOperator`](crate::Error::InvalidOperator) for an unknown tag
    /// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) for bad combinator arguments
    pub fn evaluate(&self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(literal) => Ok(Value::from(literal.clone())),

            Expression::Symbol(name) => self.env.lookup(name).cloned(),

            Expression::List(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),

            Expression::Invocation { tag, args } => {
                let combinator: Combinator = tag.parse()?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;

                trace!(combinator = %combinator, args = args.len(), "Applying combinator");
                combinator.apply(args, self)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
