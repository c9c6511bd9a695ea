//! User response records and grading verdicts.
//!
//! A user response is an answer declaration widened with the value the
//! learner actually entered, read verbatim from the live view. Responses
//! are created fresh on every extraction pass and never persisted across
//! passes.

use crate::question::VariableValue;
use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Responses
// ══════════════════════════════════════════════════════════════════════════════

/// A variable declaration carried through extraction unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserVariable {
    pub var_name: String,
    pub value: VariableValue,
}

/// An image declaration carried through extraction unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserImage {
    pub var_name: String,
    pub src: String,
}

/// A graph declaration carried through extraction unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGraph {
    pub var_name: String,
    pub equations: Vec<String>,
}

/// The learner's entry in a single-line input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub var_name: String,
    pub value: String,
}

/// The learner's entry in an essay area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEssay {
    pub var_name: String,
    pub value: String,
}

/// The learner's entry in a code editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCode {
    pub var_name: String,
    pub value: String,
}

/// A checkbox's checked state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCheck {
    pub var_name: String,
    pub checked: bool,
}

/// A radio button's checked state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRadio {
    pub var_name: String,
    pub checked: bool,
}

/// Every extracted response collection from one extraction pass.
///
/// Field order is the fixed extraction order; downstream scripting depends
/// on it being deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseSet {
    pub variables: Vec<UserVariable>,
    pub images: Vec<UserImage>,
    pub graphs: Vec<UserGraph>,
    pub inputs: Vec<UserInput>,
    pub essays: Vec<UserEssay>,
    pub codes: Vec<UserCode>,
    pub checks: Vec<UserCheck>,
    pub radios: Vec<UserRadio>,
}

/// The sentinel recorded when a declared widget is missing from the live
/// view. Extraction degrades per-widget instead of aborting the batch.
pub fn missing_widget_value(var_name: &str) -> String {
    format!("{var_name} was not found")
}

// ══════════════════════════════════════════════════════════════════════════════
// Verdicts
// ══════════════════════════════════════════════════════════════════════════════

/// The three-way grading outcome.
///
/// `ScriptError` is deliberately distinct from `Incorrect`: authors must be
/// able to tell "the question itself is broken" from "the learner answered
/// wrong".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Correct,
    Incorrect,
    ScriptError,
}

/// The graded result of one check-answer pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub message: String,
}

impl Verdict {
    pub fn correct() -> Self {
        Self {
            outcome: Outcome::Correct,
            message: "Correct".into(),
        }
    }

    pub fn incorrect() -> Self {
        Self {
            outcome: Outcome::Incorrect,
            message: "Incorrect".into(),
        }
    }

    pub fn script_error(error: impl fmt::Display) -> Self {
        Self {
            outcome: Outcome::ScriptError,
            message: format!("This question has errors:\n\n{error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_widget_sentinel_names_the_widget() {
        assert_eq!(missing_widget_value("input1"), "input1 was not found");
    }

    #[test]
    fn script_error_verdict_carries_the_error_text() {
        let verdict = Verdict::script_error("undefined variable: foo");
        assert_eq!(verdict.outcome, Outcome::ScriptError);
        assert!(verdict.message.contains("undefined variable: foo"));
        assert!(verdict.message.starts_with("This question has errors:"));
    }

    #[test]
    fn response_set_serializes_in_extraction_order() {
        let set = ResponseSet::default();
        let json = serde_json::to_string(&set).unwrap();
        let variables = json.find("\"variables\"").unwrap();
        let inputs = json.find("\"inputs\"").unwrap();
        let radios = json.find("\"radios\"").unwrap();
        assert!(variables < inputs && inputs < radios);
    }
}
