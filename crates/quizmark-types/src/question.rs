//! Question source and the compiled Built Question artifact.

use crate::ast::{CheckNode, DocumentAst, InputNode, RadioNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Author-submitted question source: markup plus scoring script.
///
/// Immutable once submitted — the session controller compares whole
/// sources to decide whether a resubmission needs a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSource {
    pub markup: String,
    pub script: String,
}

impl QuestionSource {
    pub fn new(markup: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            script: script.into(),
        }
    }
}

/// The value an embedded variable was given at compile time.
///
/// Also the type returned by variable resolvers during rendering: the
/// exercise-mode resolver answers with the unset sentinel `Number(NaN)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The compiled question artifact.
///
/// Owned exclusively by the session controller for its lifetime and
/// replaced wholesale on each successful rebuild, never mutated in place.
/// `original_variable_values` is the authoritative grading baseline: it is
/// fixed at compile time and never recomputed, so grading always compares
/// against what the learner actually saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltQuestion {
    pub ast: DocumentAst,
    pub html: String,
    pub original_variable_values: BTreeMap<String, VariableValue>,
    /// Hex SHA-256 of the `(markup, script)` source pair — a stable
    /// identity for logs and notifications.
    pub fingerprint: String,
    /// Input declarations the scoring script actually references.
    pub graded_inputs: Vec<InputNode>,
    /// Check declarations the scoring script actually references.
    pub graded_checks: Vec<CheckNode>,
    /// Radio declarations the scoring script actually references.
    pub graded_radios: Vec<RadioNode>,
}
