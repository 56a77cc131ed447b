//! Program instructions.
//!
//! Wire format:
//!
//! ```text
//! [":def_transport", name, type, priority, options?]
//! [":def", name, expr]
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

use super::expression::{Expression, symbol_name};

// ============================================================================
// Constants
// ============================================================================

const DEF_TRANSPORT: &str = "def_transport";
const DEF: &str = "def";

// ============================================================================
// Instruction
// ============================================================================

/// A single top-level program instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Registers a transport definition under `name`.
    DefTransport {
        /// Binding name.
        name: String,
        /// Registry type tag (e.g. `"ws"`).
        kind: String,
        /// Priority consulted by history-aware racing.
        priority: i64,
        /// Option map, either a literal or a reference to a bound map.
        options: Option<Expression>,
    },

    /// Evaluates `expr` and binds it under `name`.
    Def {
        /// Binding name.
        name: String,
        /// Expression to evaluate.
        expr: Expression,
    },
}

impl Instruction {
    /// Creates a `def_transport` instruction.
    #[must_use]
    pub fn def_transport(
        name: impl Into<String>,
        kind: impl Into<String>,
        priority: i64,
        options: Option<Expression>,
    ) -> Self {
        Self::DefTransport {
            name: name.into(),
            kind: kind.into(),
            priority,
            options,
        }
    }

    /// Creates a `def` instruction.
    #[must_use]
    pub fn def(name: impl Into<String>, expr: Expression) -> Self {
        Self::Def {
            name: name.into(),
            expr,
        }
    }

    /// Returns the name this instruction binds.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DefTransport { name, .. } | Self::Def { name, .. } => name,
        }
    }

    /// Parses an instruction from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProgram`] if the array shape is wrong.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::invalid_program(format!("instruction is not a list: {value}")))?;

        let tag = items
            .first()
            .and_then(JsonValue::as_str)
            .and_then(symbol_name)
            .ok_or_else(|| Error::invalid_program(format!("instruction has no tag: {value}")))?;

        match tag {
            DEF_TRANSPORT => Self::parse_def_transport(&items[1..]),
            DEF => Self::parse_def(&items[1..]),
            other => Err(Error::invalid_program(format!("unknown instruction :{other}"))),
        }
    }

    fn parse_def_transport(args: &[JsonValue]) -> Result<Self> {
        if !(3..=4).contains(&args.len()) {
            return Err(Error::invalid_program(format!(
                ":def_transport expects 3 or 4 arguments, got {}",
                args.len()
            )));
        }

        let name = string_arg(&args[0], "def_transport name")?;
        let kind = string_arg(&args[1], "def_transport type")?;
        let priority = args[2].as_i64().ok_or_else(|| {
            Error::invalid_program(format!("def_transport priority must be an integer: {}", args[2]))
        })?;
        let options = args
            .get(3)
            .filter(|value| !value.is_null())
            .map(Expression::from_value);

        Ok(Self::def_transport(name, kind, priority, options))
    }

    fn parse_def(args: &[JsonValue]) -> Result<Self> {
        let [name, expr] = args else {
            return Err(Error::invalid_program(format!(
                ":def expects 2 arguments, got {}",
                args.len()
            )));
        };

        Ok(Self::def(string_arg(name, "def name")?, Expression::from_value(expr)))
    }
}

fn string_arg(value: &JsonValue, what: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_program(format!("{what} must be a string: {value}")))
}

// ============================================================================
// Program
// ============================================================================

/// Ordered instruction list consumed once per build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates a program from instructions.
    #[inline]
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Parses a program from JSON text.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not JSON
    /// - [`Error::InvalidProgram`] if an instruction is malformed
    pub fn from_json(text: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Parses a program from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProgram`] if the value is not a list of
    /// well-formed instructions.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| Error::invalid_program("program is not a list"))?;

        let instructions = items
            .iter()
            .map(Instruction::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { instructions })
    }

    /// Returns the instructions in order.
    #[inline]
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the number of instructions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the program has no instructions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
