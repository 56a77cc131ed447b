//! Runtime values produced by evaluation.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{Error, Result};
use crate::program::Literal;
use crate::strategy::{Condition, Strategy};

// ============================================================================
// Value
// ============================================================================

/// A value bound in the build environment.
#[derive(Debug, Clone)]
pub enum Value {
    /// `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// String.
    String(String),
    /// Option map, unevaluated.
    Map(Map<String, JsonValue>),
    /// Evaluated list.
    List(Vec<Value>),
    /// Strategy node.
    Strategy(Arc<Strategy>),
    /// Branch condition.
    Condition(Condition),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Self::Null,
            Literal::Bool(b) => Self::Bool(b),
            Literal::Number(n) => Self::Number(n),
            Literal::String(s) => Self::String(s),
            Literal::Map(m) => Self::Map(m),
        }
    }
}

impl From<Arc<Strategy>> for Value {
    fn from(strategy: Arc<Strategy>) -> Self {
        Self::Strategy(strategy)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl Value {
    /// Returns the value's type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Map(_) => "map",
            Self::List(_) => "list",
            Self::Strategy(_) => "strategy",
            Self::Condition(_) => "condition",
        }
    }

    /// Returns the strategy node, if this is one.
    #[inline]
    #[must_use]
    pub fn as_strategy(&self) -> Option<&Arc<Strategy>> {
        match self {
            Self::Strategy(s) => Some(s),
            _ => None,
        }
    }

    /// Converts into a strategy node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming `context` otherwise.
    pub fn into_strategy(self, context: &str) -> Result<Arc<Strategy>> {
        match self {
            Self::Strategy(s) => Ok(s),
            other => Err(other.mismatch(context, "strategy")),
        }
    }

    /// Converts into a non-negative millisecond duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless this is a non-negative number.
    pub fn into_duration(self, context: &str) -> Result<Duration> {
        match &self {
            Self::Number(n) => {
                if let Some(ms) = n.as_u64() {
                    return Ok(Duration::from_millis(ms));
                }
                match n.as_f64() {
                    Some(ms) if ms >= 0.0 => Duration::try_from_secs_f64(ms / 1000.0)
                        .map_err(|_| self.mismatch(context, "duration in range")),
                    _ => Err(self.mismatch(context, "non-negative number")),
                }
            }
            _ => Err(self.mismatch(context, "number")),
        }
    }

    /// Converts into an option map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless this is a map.
    pub fn into_map(self, context: &str) -> Result<Map<String, JsonValue>> {
        match self {
            Self::Map(m) => Ok(m),
            other => Err(other.mismatch(context, "map")),
        }
    }

    /// Converts into a branch condition. Booleans become constant conditions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] otherwise.
    pub fn into_condition(self, context: &str) -> Result<Condition> {
        match self {
            Self::Condition(c) => Ok(c),
            Self::Bool(b) => Ok(Condition::Constant(b)),
            other => Err(other.mismatch(context, "condition")),
        }
    }

    fn mismatch(&self, context: &str, expected: &str) -> Error {
        Error::invalid_argument(format!(
            "{context} expects a {expected}, got {}",
            self.type_name()
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
