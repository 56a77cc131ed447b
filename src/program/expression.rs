//! Expression AST.
//!
//! Expressions are parsed from JSON values:
//!
//! | JSON | Expression |
//! |------|------------|
//! | `":name"` | [`Expression::Symbol`] |
//! | `[":name"]` | [`Expression::Symbol`] (parenthesised reference) |
//! | `[":tag"]` | [`Expression::Invocation`] with no arguments, for combinator tags |
//! | `[":tag", arg, ...]` | [`Expression::Invocation`] |
//! | `[non-symbol, ...]` | [`Expression::List`] |
//! | anything else | [`Expression::Literal`] |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Number, Value as JsonValue};

use crate::builder::Combinator;

use super::SYMBOL_MARKER;

// ============================================================================
// Literal
// ============================================================================

/// A literal value. Map values are kept as raw JSON and never evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal.
    Number(Number),
    /// String literal that is not a symbol.
    String(String),
    /// Option map.
    Map(Map<String, JsonValue>),
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Map<String, JsonValue>> for Literal {
    fn from(value: Map<String, JsonValue>) -> Self {
        Self::Map(value)
    }
}

// ============================================================================
// Expression
// ============================================================================

/// A program expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value.
    Literal(Literal),

    /// Reference to a bound name (stored without the `:` marker).
    Symbol(String),

    /// List of sub-expressions evaluated left to right.
    List(Vec<Expression>),

    /// Combinator call.
    Invocation {
        /// Operator tag (without the `:` marker).
        tag: String,
        /// Arguments, evaluated eagerly left to right.
        args: Vec<Expression>,
    },
}

// ============================================================================
// Constructors
// ============================================================================

impl Expression {
    /// Creates a symbol reference.
    #[inline]
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates a combinator invocation.
    #[inline]
    #[must_use]
    pub fn invoke(tag: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Invocation {
            tag: tag.into(),
            args,
        }
    }

    /// Creates a literal expression.
    #[inline]
    #[must_use]
    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::Literal(value.into())
    }

    /// Parses an expression from its JSON wire form.
    ///
    /// Every JSON value is a valid expression, so this never fails.
    #[must_use]
    pub fn from_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Literal(Literal::Null),
            JsonValue::Bool(b) => Self::Literal(Literal::Bool(*b)),
            JsonValue::Number(n) => Self::Literal(Literal::Number(n.clone())),
            JsonValue::String(s) => match symbol_name(s) {
                Some(name) => Self::Symbol(name.to_string()),
                None => Self::Literal(Literal::String(s.clone())),
            },
            JsonValue::Object(map) => Self::Literal(Literal::Map(map.clone())),
            JsonValue::Array(items) => Self::from_array(items),
        }
    }

    fn from_array(items: &[JsonValue]) -> Self {
        let head = items.first().and_then(JsonValue::as_str).and_then(symbol_name);

        match head {
            Some(name) if items.len() == 1 && name.parse::<Combinator>().is_err() => {
                Self::Symbol(name.to_string())
            }
            Some(tag) => Self::Invocation {
                tag: tag.to_string(),
                args: items[1..].iter().map(Self::from_value).collect(),
            },
            None => Self::List(items.iter().map(Self::from_value).collect()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns the symbol name if `text` carries the symbol marker.
#[inline]
#[must_use]
pub fn symbol_name(text: &str) -> Option<&str> {
    text.strip_prefix(SYMBOL_MARKER).filter(|name| !name.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
