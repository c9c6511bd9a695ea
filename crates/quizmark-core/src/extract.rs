//! Response extraction — reconciling declarations against the live view.
//!
//! For every answer declaration in the AST, find the live widget with the
//! same `varName` and read its state verbatim: no coercion, no trimming.
//! A missing widget degrades to a sentinel response instead of aborting
//! the batch, so one broken widget never hides the rest.

use crate::registry::ViewRegistry;
use quizmark_types::{
    answer::missing_widget_value, AstNode, DocumentAst, NodeKind, ResponseSet, UserCheck,
    UserCode, UserEssay, UserGraph, UserImage, UserInput, UserRadio, UserVariable,
};
use tracing::debug;

/// Which declarations an extraction pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionScope {
    /// Skip declarations nested inside the solution subtree (grading the
    /// exercise view — the common case).
    Exercise,
    /// Include the solution subtree (explicitly grading the solution view).
    WithSolution,
}

impl ExtractionScope {
    fn exclusions(self) -> &'static [NodeKind] {
        match self {
            Self::Exercise => &[NodeKind::Solution],
            Self::WithSolution => &[],
        }
    }
}

/// Extract one typed response per declaration, in the fixed kind order:
/// variables, images, graphs, inputs, essays, codes, checks, radios.
///
/// The order is part of the contract — downstream scripting sees a
/// deterministic sequence regardless of widget health.
pub fn extract(ast: &DocumentAst, registry: &ViewRegistry, scope: ExtractionScope) -> ResponseSet {
    let exclude = scope.exclusions();

    let variables = ast
        .nodes_of_kind(NodeKind::Variable, exclude)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Variable(v) => Some(UserVariable {
                var_name: v.var_name.clone(),
                value: v.value.clone(),
            }),
            _ => None,
        })
        .collect();

    let images = ast
        .nodes_of_kind(NodeKind::Image, exclude)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Image(i) => Some(UserImage {
                var_name: i.var_name.clone(),
                src: i.src.clone(),
            }),
            _ => None,
        })
        .collect();

    let graphs = ast
        .nodes_of_kind(NodeKind::Graph, exclude)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Graph(g) => Some(UserGraph {
                var_name: g.var_name.clone(),
                equations: g.equations.clone(),
            }),
            _ => None,
        })
        .collect();

    let inputs = text_responses(ast, registry, NodeKind::Input, exclude)
        .into_iter()
        .map(|(var_name, value)| UserInput { var_name, value })
        .collect();
    let essays = text_responses(ast, registry, NodeKind::Essay, exclude)
        .into_iter()
        .map(|(var_name, value)| UserEssay { var_name, value })
        .collect();
    let codes = text_responses(ast, registry, NodeKind::Code, exclude)
        .into_iter()
        .map(|(var_name, value)| UserCode { var_name, value })
        .collect();

    let checks = toggle_responses(ast, registry, NodeKind::Check, exclude)
        .into_iter()
        .map(|(var_name, checked)| UserCheck { var_name, checked })
        .collect();
    let radios = toggle_responses(ast, registry, NodeKind::Radio, exclude)
        .into_iter()
        .map(|(var_name, checked)| UserRadio { var_name, checked })
        .collect();

    ResponseSet {
        variables,
        images,
        graphs,
        inputs,
        essays,
        codes,
        checks,
        radios,
    }
}

/// Read the text widget for each declaration of `kind`; missing widgets
/// yield the not-found sentinel.
fn text_responses(
    ast: &DocumentAst,
    registry: &ViewRegistry,
    kind: NodeKind,
    exclude: &[NodeKind],
) -> Vec<(String, String)> {
    ast.nodes_of_kind(kind, exclude)
        .into_iter()
        .filter_map(AstNode::var_name)
        .map(|name| {
            let value = match registry.text(name) {
                Some(value) => value.to_string(),
                None => {
                    debug!(var_name = name, "declared widget missing from live view");
                    missing_widget_value(name)
                }
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Read the toggle widget for each declaration of `kind`; missing
/// widgets default to unchecked.
fn toggle_responses(
    ast: &DocumentAst,
    registry: &ViewRegistry,
    kind: NodeKind,
    exclude: &[NodeKind],
) -> Vec<(String, bool)> {
    ast.nodes_of_kind(kind, exclude)
        .into_iter()
        .filter_map(AstNode::var_name)
        .map(|name| {
            let checked = match registry.checked(name) {
                Some(checked) => checked,
                None => {
                    debug!(var_name = name, "declared widget missing from live view");
                    false
                }
            };
            (name.to_string(), checked)
        })
        .collect()
}
