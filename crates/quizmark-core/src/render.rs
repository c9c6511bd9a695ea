//! Dual-mode document rendering.
//!
//! One AST, two views. The exercise view re-renders through the markup
//! compiler with blanking resolvers; the solution view substitutes the
//! solution node's pre-serialized markup wholesale instead of rendering
//! variable by variable.

use crate::compile::MarkupCompiler;
use crate::store::ViewMode;
use quizmark_types::{DocumentAst, VariableValue};

/// The sentinel a variable resolves to in exercise mode — an unset
/// numeric value, never a real answer.
pub const UNSET_VARIABLE: VariableValue = VariableValue::Number(f64::NAN);

/// Render the exercise view: variables resolve to the unset sentinel and
/// answers to the empty string, so every widget renders interactive and
/// blank.
///
/// Called again after a solution view this regenerates blanks fresh from
/// the AST — widget identities stay stable under the same `varName`, so
/// later lookups keep working.
pub fn render_exercise<C>(compiler: &C, ast: &DocumentAst) -> String
where
    C: MarkupCompiler + ?Sized,
{
    compiler.render(&ast.nodes, &|_| UNSET_VARIABLE, &|_| String::new())
}

/// The solution view body: the designated solution node's inner markup.
///
/// Returns `None` when the document declares no solution; with
/// duplicates the first in document order wins.
pub fn solution_fragment(ast: &DocumentAst) -> Option<&str> {
    ast.solution().map(|solution| solution.inner_html.as_str())
}

/// Render the document body for a mode.
///
/// `None` only for a solution render of a document with no solution
/// node — the caller decides how to degrade.
pub fn render_mode<C>(compiler: &C, ast: &DocumentAst, mode: ViewMode) -> Option<String>
where
    C: MarkupCompiler + ?Sized,
{
    match mode {
        ViewMode::Exercise => Some(render_exercise(compiler, ast)),
        ViewMode::Solution => solution_fragment(ast).map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_types::{AstNode, SolutionNode};

    #[test]
    fn unset_sentinel_is_not_a_number_value() {
        let VariableValue::Number(n) = UNSET_VARIABLE else {
            panic!("sentinel must be numeric");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn solution_fragment_is_the_inner_markup() {
        let ast = DocumentAst::new(vec![AstNode::Solution(SolutionNode {
            var_name: "solution1".into(),
            content: vec![],
            inner_html: "<p>x = 4</p>".into(),
        })]);
        assert_eq!(solution_fragment(&ast), Some("<p>x = 4</p>"));
    }

    #[test]
    fn solution_fragment_absent_without_solution_node() {
        assert_eq!(solution_fragment(&DocumentAst::default()), None);
    }
}
