//! The quizmark scoring-script language.
//!
//! A small, statement-oriented expression language that question authors
//! use to grade extracted learner responses. Scripts execute in a
//! capability-scoped sandbox: the only reachable state is the seeded
//! bindings, there is no ambient environment or I/O, and every evaluation
//! step consumes gas so runaway scripts trap instead of hanging the host.

pub mod ast;
mod env;
mod error;
mod eval;
mod lexer;
mod parser;
mod scan;
mod token;
mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult, ParseError};
pub use eval::Evaluator;
pub use lexer::lex;
pub use parser::parse;
pub use scan::{scan_answer_references, ReferenceKind};
pub use token::{Pos, Token, TokenKind};
pub use value::Value;

use std::collections::BTreeMap;

/// The binding a script assigns its verdict into.
pub const ANSWER_BINDING: &str = "answer";

/// Parse and execute a scoring script against the given bindings.
///
/// Seeds the environment with `bindings` plus `answer = nil`, runs the
/// script under `gas_limit`, and returns the final value of `answer`.
/// Every failure — syntax, undefined binding, type trap, gas exhaustion —
/// comes back as an [`EvalError`] whose `Display` is the author-facing
/// message.
pub fn evaluate(
    source: &str,
    bindings: BTreeMap<String, Value>,
    gas_limit: u64,
) -> EvalResult<Value> {
    let program = parse(source).map_err(|e| EvalError::Syntax(e.to_string()))?;
    let mut evaluator = Evaluator::new(gas_limit);
    for (name, value) in bindings {
        evaluator.env.define(&name, value);
    }
    evaluator.env.define(ANSWER_BINDING, Value::Nil);
    evaluator.run(&program)?;
    Ok(evaluator
        .env
        .get(ANSWER_BINDING)
        .cloned()
        .unwrap_or(Value::Nil))
}
