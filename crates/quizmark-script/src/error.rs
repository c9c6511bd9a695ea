//! Error types for the scoring-script language.

use std::fmt;
use thiserror::Error;

/// A lex or parse failure, reported at the first offending position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }
}

/// Evaluation error — runtime traps inside a scoring script.
///
/// The `Display` text is the author-facing message carried into a
/// `ScriptError` verdict, so it names the failure plainly.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Script failed to lex or parse.
    Syntax(String),
    /// Reference to a binding the environment does not contain.
    UndefinedVariable(String),
    /// Field access on a value that has no such field.
    UnknownField(String),
    /// Operand types invalid for the operation.
    TypeMismatch(String),
    /// Division or modulo by zero.
    DivisionByZero,
    /// Call to a function outside the builtin set.
    UnknownFunction(String),
    /// Builtin called with the wrong number of arguments.
    WrongArgCount(String),
    /// Gas exhaustion — the script ran too many steps.
    GasExhausted,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Self::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Self::UnknownField(msg) => write!(f, "unknown field: {msg}"),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::WrongArgCount(msg) => write!(f, "wrong argument count: {msg}"),
            Self::GasExhausted => write!(f, "script exceeded its evaluation budget"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
