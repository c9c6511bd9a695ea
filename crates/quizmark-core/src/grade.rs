//! Grading bridge — seeded sandbox execution and verdict mapping.
//!
//! The scoring script runs on a blocking task under two independent
//! bounds: the interpreter's gas limit and a wall-clock timeout. Every
//! failure lands in the error channel of the raw grade; the verdict
//! mapping then produces exactly one of Correct / Incorrect /
//! ScriptError.

use quizmark_script::Value;
use quizmark_types::{BuiltQuestion, ResponseSet, VariableValue, Verdict};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Evaluation step budget for one grading pass.
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Wall-clock bound for one grading pass.
pub const EVAL_TIMEOUT: Duration = Duration::from_secs(5);

/// The raw outcome of one sandbox run, before verdict mapping.
#[derive(Debug, Clone, PartialEq)]
struct RawGrade {
    answer: Option<bool>,
    error: Option<String>,
}

/// Grade extracted responses against the scoring script.
///
/// Seeds the sandbox with one namespace record per response collection
/// plus the original variable values — the baseline fixed at compile
/// time, so grading compares against what the learner actually saw.
pub async fn grade(script: &str, built: &BuiltQuestion, responses: &ResponseSet) -> Verdict {
    let bindings = script_bindings(built, responses);
    let raw = run_sandboxed(script.to_string(), bindings).await;
    match raw {
        RawGrade {
            answer: Some(true), ..
        } => Verdict::correct(),
        RawGrade {
            error: Some(message),
            ..
        } => {
            warn!(fingerprint = %built.fingerprint, error = %message, "scoring script failed");
            Verdict::script_error(message)
        }
        _ => Verdict::incorrect(),
    }
}

async fn run_sandboxed(script: String, bindings: BTreeMap<String, Value>) -> RawGrade {
    let task = tokio::task::spawn_blocking(move || {
        quizmark_script::evaluate(&script, bindings, DEFAULT_GAS_LIMIT)
    });
    match tokio::time::timeout(EVAL_TIMEOUT, task).await {
        Ok(Ok(Ok(value))) => RawGrade {
            answer: Some(matches!(value, Value::Bool(true))),
            error: None,
        },
        Ok(Ok(Err(eval_error))) => RawGrade {
            answer: None,
            error: Some(eval_error.to_string()),
        },
        Ok(Err(join_error)) => RawGrade {
            answer: None,
            error: Some(format!("script evaluation aborted: {join_error}")),
        },
        Err(_) => RawGrade {
            answer: None,
            error: Some("script evaluation timed out".to_string()),
        },
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Binding assembly
// ══════════════════════════════════════════════════════════════════════════════

/// One namespace record per collection, keyed by `varName`.
///
/// Duplicate `varName`s collapse by last-match-wins, mirroring widget
/// lookup in the live view.
fn script_bindings(built: &BuiltQuestion, responses: &ResponseSet) -> BTreeMap<String, Value> {
    let mut bindings = BTreeMap::new();

    let variable = built
        .original_variable_values
        .iter()
        .map(|(name, value)| (name.clone(), field_record("value", value_of(value))));
    bindings.insert("variable".to_string(), Value::Record(variable.collect()));

    let input = responses
        .inputs
        .iter()
        .map(|r| (r.var_name.clone(), field_record("value", Value::Text(r.value.clone()))));
    bindings.insert("input".to_string(), Value::Record(input.collect()));

    let essay = responses
        .essays
        .iter()
        .map(|r| (r.var_name.clone(), field_record("value", Value::Text(r.value.clone()))));
    bindings.insert("essay".to_string(), Value::Record(essay.collect()));

    let code = responses
        .codes
        .iter()
        .map(|r| (r.var_name.clone(), field_record("value", Value::Text(r.value.clone()))));
    bindings.insert("code".to_string(), Value::Record(code.collect()));

    let check = responses
        .checks
        .iter()
        .map(|r| (r.var_name.clone(), field_record("checked", Value::Bool(r.checked))));
    bindings.insert("check".to_string(), Value::Record(check.collect()));

    let radio = responses
        .radios
        .iter()
        .map(|r| (r.var_name.clone(), field_record("checked", Value::Bool(r.checked))));
    bindings.insert("radio".to_string(), Value::Record(radio.collect()));

    let image = responses
        .images
        .iter()
        .map(|r| (r.var_name.clone(), field_record("src", Value::Text(r.src.clone()))));
    bindings.insert("image".to_string(), Value::Record(image.collect()));

    let graph = responses.graphs.iter().map(|r| {
        let equations = r.equations.iter().cloned().map(Value::Text).collect();
        (
            r.var_name.clone(),
            field_record("equations", Value::List(equations)),
        )
    });
    bindings.insert("graph".to_string(), Value::Record(graph.collect()));

    bindings
}

fn field_record(field: &str, value: Value) -> Value {
    Value::record([(field.to_string(), value)])
}

fn value_of(value: &VariableValue) -> Value {
    match value {
        VariableValue::Number(n) => Value::Number(*n),
        VariableValue::Text(s) => Value::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_types::{DocumentAst, Outcome, UserInput, UserRadio};

    fn built_with_variable(name: &str, value: VariableValue) -> BuiltQuestion {
        let mut original_variable_values = BTreeMap::new();
        original_variable_values.insert(name.to_string(), value);
        BuiltQuestion {
            ast: DocumentAst::default(),
            html: String::new(),
            original_variable_values,
            fingerprint: "test".into(),
            graded_inputs: vec![],
            graded_checks: vec![],
            graded_radios: vec![],
        }
    }

    fn responses_with_input(name: &str, value: &str) -> ResponseSet {
        ResponseSet {
            inputs: vec![UserInput {
                var_name: name.into(),
                value: value.into(),
            }],
            ..ResponseSet::default()
        }
    }

    #[tokio::test]
    async fn strict_equality_across_types_is_incorrect() {
        let built = built_with_variable("x", VariableValue::Number(4.0));
        let responses = responses_with_input("x", "4");
        let verdict = grade("answer = input.x.value == variable.x.value", &built, &responses).await;
        assert_eq!(verdict.outcome, Outcome::Incorrect);
        assert_eq!(verdict.message, "Incorrect");
    }

    #[tokio::test]
    async fn author_coercion_grades_correct() {
        let built = built_with_variable("x", VariableValue::Number(4.0));
        let responses = responses_with_input("x", "4");
        let verdict = grade(
            "answer = number(input.x.value) == variable.x.value",
            &built,
            &responses,
        )
        .await;
        assert_eq!(verdict.outcome, Outcome::Correct);
        assert_eq!(verdict.message, "Correct");
    }

    #[tokio::test]
    async fn undefined_binding_is_a_script_error() {
        let built = built_with_variable("x", VariableValue::Number(4.0));
        let verdict = grade("answer = not_a_binding", &built, &ResponseSet::default()).await;
        assert_eq!(verdict.outcome, Outcome::ScriptError);
        assert!(verdict.message.contains("undefined variable: not_a_binding"));
    }

    #[tokio::test]
    async fn non_boolean_answer_is_incorrect_not_error() {
        let built = built_with_variable("x", VariableValue::Number(4.0));
        let verdict = grade("answer = 42", &built, &ResponseSet::default()).await;
        assert_eq!(verdict.outcome, Outcome::Incorrect);
    }

    #[tokio::test]
    async fn duplicate_var_name_collapses_last_wins() {
        let built = built_with_variable("x", VariableValue::Number(1.0));
        let responses = ResponseSet {
            inputs: vec![
                UserInput {
                    var_name: "x".into(),
                    value: "first".into(),
                },
                UserInput {
                    var_name: "x".into(),
                    value: "last".into(),
                },
            ],
            ..ResponseSet::default()
        };
        let verdict = grade(
            "answer = input.x.value == \"last\"",
            &built,
            &responses,
        )
        .await;
        assert_eq!(verdict.outcome, Outcome::Correct);
    }

    #[tokio::test]
    async fn radio_namespace_reads_checked_state() {
        let built = built_with_variable("x", VariableValue::Number(1.0));
        let responses = ResponseSet {
            radios: vec![UserRadio {
                var_name: "r1".into(),
                checked: true,
            }],
            ..ResponseSet::default()
        };
        let verdict = grade("answer = radio.r1.checked", &built, &responses).await;
        assert_eq!(verdict.outcome, Outcome::Correct);
    }
}
