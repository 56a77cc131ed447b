//! Combinator table.
//!
//! | Tag | Arguments | Result |
//! |-----|-----------|--------|
//! | `:delayed` | `ms, strategy` | [`DelayedStrategy`] |
//! | `:sequential` | `options?, strategy...` | [`SequentialStrategy`] |
//! | `:cached` | `ttl_ms, strategy` | [`CachedStrategy`] |
//! | `:first_connected` | `strategy...` | [`FirstConnectedStrategy`] |
//! | `:best_connected_ever` | `strategy...` | [`BestConnectedEverStrategy`] |
//! | `:if` | `condition, strategy, strategy` | [`IfStrategy`] |
//! | `:is_supported` | `strategy` | [`Condition::IsSupported`] |
//!
//! Strategy lists may also be passed as a single list argument.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::strategy::{
    BestConnectedEverStrategy, CachedStrategy, Condition, DelayedStrategy, FirstConnectedStrategy,
    IfStrategy, SequentialOptions, SequentialStrategy, Strategy,
};

use super::evaluator::Evaluator;
use super::value::Value;

// ============================================================================
// Combinator
// ============================================================================

/// A recognised invocation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `:delayed`
    Delayed,
    /// `:sequential`
    Sequential,
    /// `:cached`
    Cached,
    /// `:first_connected`
    FirstConnected,
    /// `:best_connected_ever`
    BestConnectedEver,
    /// `:if`
    If,
    /// `:is_supported`
    IsSupported,
}

impl Combinator {
    /// All combinators.
    pub const ALL: [Self; 7] = [
        Self::Delayed,
        Self::Sequential,
        Self::Cached,
        Self::FirstConnected,
        Self::BestConnectedEver,
        Self::If,
        Self::IsSupported,
    ];

    /// Returns the tag without the `:` marker.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Delayed => "delayed",
            Self::Sequential => "sequential",
            Self::Cached => "cached",
            Self::FirstConnected => "first_connected",
            Self::BestConnectedEver => "best_connected_ever",
            Self::If => "if",
            Self::IsSupported => "is_supported",
        }
    }

    /// Applies the combinator to evaluated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] on an arity or type mismatch.
    pub fn apply(self, args: Vec<Value>, evaluator: &Evaluator<'_>) -> Result<Value> {
        let tag = self.tag();

        let strategy = match self {
            Self::Delayed => {
                let [delay, strategy] = exact::<2>(tag, args)?;
                Strategy::Delayed(DelayedStrategy::new(
                    delay.into_duration(tag)?,
                    strategy.into_strategy(tag)?,
                ))
            }

            Self::Sequential => {
                let mut args = args.into_iter().peekable();
                let options = match args.next_if(|arg| matches!(arg, Value::Map(_))) {
                    Some(map) => sequential_options(map.into_map(tag)?)?,
                    None => SequentialOptions::default(),
                };
                Strategy::Sequential(SequentialStrategy::new(
                    strategies(tag, args.collect())?,
                    options,
                ))
            }

            Self::Cached => {
                let [ttl, strategy] = exact::<2>(tag, args)?;
                Strategy::Cached(CachedStrategy::new(
                    ttl.into_duration(tag)?,
                    evaluator.options().encrypted,
                    strategy.into_strategy(tag)?,
                    evaluator.environment().transports(),
                    Arc::clone(evaluator.cache()),
                ))
            }

            Self::FirstConnected => {
                Strategy::FirstConnected(FirstConnectedStrategy::new(strategies(tag, args)?))
            }

            Self::BestConnectedEver => {
                Strategy::BestConnectedEver(BestConnectedEverStrategy::new(strategies(tag, args)?))
            }

            Self::If => {
                let [condition, on_true, on_false] = exact::<3>(tag, args)?;
                Strategy::If(IfStrategy::new(
                    condition.into_condition(tag)?,
                    on_true.into_strategy(tag)?,
                    on_false.into_strategy(tag)?,
                ))
            }

            Self::IsSupported => {
                let [strategy] = exact::<1>(tag, args)?;
                return Ok(Value::Condition(Condition::IsSupported(
                    strategy.into_strategy(tag)?,
                )));
            }
        };

        Ok(Value::Strategy(Arc::new(strategy)))
    }
}

impl FromStr for Combinator {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.tag() == tag)
            .ok_or_else(|| Error::invalid_operator(tag))
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.tag())
    }
}

// ============================================================================
// Argument Helpers
// ============================================================================

fn exact<const N: usize>(tag: &str, args: Vec<Value>) -> Result<[Value; N]> {
    let count = args.len();
    args.try_into().map_err(|_| {
        Error::invalid_argument(format!("{tag} expects {N} arguments, got {count}"))
    })
}

/// Collects strategy arguments, flattening list arguments.
fn strategies(tag: &str, args: Vec<Value>) -> Result<Vec<Arc<Strategy>>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::List(items) => {
                for item in items {
                    out.push(item.into_strategy(tag)?);
                }
            }
            other => out.push(other.into_strategy(tag)?),
        }
    }

    if out.is_empty() {
        return Err(Error::invalid_argument(format!(
            "{tag} expects at least one strategy"
        )));
    }
    Ok(out)
}

fn sequential_options(map: serde_json::Map<String, JsonValue>) -> Result<SequentialOptions> {
    serde_json::from_value(JsonValue::Object(map))
        .map_err(|e| Error::invalid_argument(format!("sequential options: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        for combinator in Combinator::ALL {
            assert_eq!(combinator.tag().parse::<Combinator>().expect("known"), combinator);
        }
    }

    #[test]
    fn test_unknown_tag_is_invalid_operator() {
        let err = "wut".parse::<Combinator>().unwrap_err();
        assert!(matches!(err, Error::InvalidOperator { .. }));
        assert_eq!(err.to_string(), "Calling non-function :wut");
    }

    #[test]
    fn test_display_includes_marker() {
        assert_eq!(Combinator::FirstConnected.to_string(), ":first_connected");
    }

    #[test]
    fn test_arity_mismatch() {
        let err = exact::<2>("delayed", vec![Value::Null]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: delayed expects 2 arguments, got 1"
        );
    }

    #[test]
    fn test_sequential_options_type_error() {
        let mut map = serde_json::Map::new();
        map.insert("timeout".into(), "soon".into());
        assert!(matches!(
            sequential_options(map),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
