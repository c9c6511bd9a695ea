//! Question builder — source pair to Built Question.
//!
//! Structural compilation is delegated to the external markup compiler
//! behind the [`MarkupCompiler`] seam; this module adds what grading
//! needs on top: build-time validation of the scoring script, the
//! graded-widget lists derived from a source scan, and the source
//! fingerprint.

use async_trait::async_trait;
use quizmark_script::{scan_answer_references, ReferenceKind};
use quizmark_types::{
    AstNode, BuildError, BuiltQuestion, DocumentAst, NodeKind, VariableValue,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Variable resolver used during rendering: `varName -> value`.
pub type VariableResolver<'a> = &'a dyn Fn(&str) -> VariableValue;

/// Answer resolver used during rendering: `varName -> prefilled answer`.
pub type AnswerResolver<'a> = &'a dyn Fn(&str) -> String;

/// The external markup compiler's output for one source pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDocument {
    pub ast: DocumentAst,
    pub html: String,
    pub original_variable_values: BTreeMap<String, VariableValue>,
}

/// The external markup compiler and HTML serializer.
///
/// Consumed as a black box: `build` compiles a source pair into an AST,
/// rendered HTML, and the variable values chosen at compile time;
/// `render` re-serializes a node list under the supplied resolvers.
/// Compile failures propagate untouched — classification is the
/// caller's job.
#[async_trait]
pub trait MarkupCompiler: Send + Sync {
    async fn build(&self, markup: &str, script: &str) -> Result<CompiledDocument, BuildError>;

    fn render(
        &self,
        nodes: &[AstNode],
        variables: VariableResolver<'_>,
        answers: AnswerResolver<'_>,
    ) -> String;
}

/// Build a question from its source pair.
///
/// Fails with [`BuildError::Markup`] when the markup compiler rejects
/// the source and [`BuildError::Script`] when the scoring script does
/// not parse — authoring mistakes surface here, not at first grading.
pub async fn build_question<C>(
    compiler: &C,
    markup: &str,
    script: &str,
) -> Result<BuiltQuestion, BuildError>
where
    C: MarkupCompiler + ?Sized,
{
    let compiled = compiler.build(markup, script).await?;
    quizmark_script::parse(script).map_err(|e| BuildError::Script(e.to_string()))?;

    let graded_inputs = graded_declarations(&compiled.ast, script, ReferenceKind::Input)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Input(input) => Some(input.clone()),
            _ => None,
        })
        .collect();
    let graded_checks = graded_declarations(&compiled.ast, script, ReferenceKind::Check)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Check(check) => Some(check.clone()),
            _ => None,
        })
        .collect();
    let graded_radios = graded_declarations(&compiled.ast, script, ReferenceKind::Radio)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Radio(radio) => Some(radio.clone()),
            _ => None,
        })
        .collect();

    Ok(BuiltQuestion {
        fingerprint: source_fingerprint(markup, script),
        ast: compiled.ast,
        html: compiled.html,
        original_variable_values: compiled.original_variable_values,
        graded_inputs,
        graded_checks,
        graded_radios,
    })
}

/// Declarations of the scanned kind that the script actually addresses,
/// in document order.
fn graded_declarations<'a>(
    ast: &'a DocumentAst,
    script: &str,
    kind: ReferenceKind,
) -> Vec<&'a AstNode> {
    let referenced = scan_answer_references(script, kind);
    let node_kind = match kind {
        ReferenceKind::Input => NodeKind::Input,
        ReferenceKind::Check => NodeKind::Check,
        ReferenceKind::Radio => NodeKind::Radio,
    };
    ast.nodes_of_kind(node_kind, &[NodeKind::Solution])
        .into_iter()
        .filter(|node| {
            node.var_name()
                .is_some_and(|name| referenced.iter().any(|r| r == name))
        })
        .collect()
}

/// Hex SHA-256 over the source pair — a stable identity for a Built
/// Question in logs and notifications.
pub fn source_fingerprint(markup: &str, script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markup.as_bytes());
    // Length prefix keeps ("ab", "c") distinct from ("a", "bc").
    hasher.update((markup.len() as u64).to_le_bytes());
    hasher.update(script.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_source_sensitive() {
        let a = source_fingerprint("[input]", "answer = true");
        let b = source_fingerprint("[input]", "answer = true");
        let c = source_fingerprint("[input]", "answer = false");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_respects_source_boundary() {
        assert_ne!(source_fingerprint("ab", "c"), source_fingerprint("a", "bc"));
    }
}
