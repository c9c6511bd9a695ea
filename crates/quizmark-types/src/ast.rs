//! Document AST node types for compiled question markup.
//!
//! The AST is a closed tagged union over widget kinds, produced by the
//! external markup compiler and consumed read-only by the pipeline.
//! Node order follows document order; container nodes ([`CheckNode`],
//! [`RadioNode`], [`DragNode`], [`DropNode`], [`SolutionNode`]) carry
//! child node lists.

use crate::question::VariableValue;
use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════════════════════
// Document
// ══════════════════════════════════════════════════════════════════════════════

/// A complete compiled question document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentAst {
    pub nodes: Vec<AstNode>,
}

impl DocumentAst {
    pub fn new(nodes: Vec<AstNode>) -> Self {
        Self { nodes }
    }

    /// Collect every node of `kind` in document order.
    ///
    /// Subtrees rooted at a node whose kind appears in `exclude` are
    /// skipped entirely. Passing `&[NodeKind::Solution]` yields the
    /// exercise-scope view of the document.
    pub fn nodes_of_kind(&self, kind: NodeKind, exclude: &[NodeKind]) -> Vec<&AstNode> {
        let mut found = Vec::new();
        collect_nodes(&self.nodes, kind, exclude, &mut found);
        found
    }

    /// The first solution node in the document, if any.
    ///
    /// Well-formed questions carry exactly one; duplicates are tolerated
    /// by taking the first in document order.
    pub fn solution(&self) -> Option<&SolutionNode> {
        self.nodes_of_kind(NodeKind::Solution, &[])
            .into_iter()
            .find_map(|node| match node {
                AstNode::Solution(solution) => Some(solution),
                _ => None,
            })
    }
}

fn collect_nodes<'a>(
    nodes: &'a [AstNode],
    kind: NodeKind,
    exclude: &[NodeKind],
    found: &mut Vec<&'a AstNode>,
) {
    for node in nodes {
        if exclude.contains(&node.kind()) {
            continue;
        }
        if node.kind() == kind {
            found.push(node);
        }
        if let Some(children) = node.children() {
            collect_nodes(children, kind, exclude, found);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

/// A single document node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AstNode {
    /// Plain text / raw markup between widgets.
    Content(ContentNode),
    /// An embedded variable placeholder.
    Variable(VariableNode),
    /// A single-line answer input.
    Input(InputNode),
    /// A free-text essay area.
    Essay(EssayNode),
    /// A code editor widget.
    Code(CodeNode),
    /// A checkbox with label content.
    Check(CheckNode),
    /// A radio button with label content.
    Radio(RadioNode),
    /// A draggable item.
    Drag(DragNode),
    /// A drop target.
    Drop(DropNode),
    /// An embedded image.
    Image(ImageNode),
    /// A function graph.
    Graph(GraphNode),
    /// The author's worked solution subtree.
    Solution(SolutionNode),
}

impl AstNode {
    /// The kind discriminant of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Content(_) => NodeKind::Content,
            Self::Variable(_) => NodeKind::Variable,
            Self::Input(_) => NodeKind::Input,
            Self::Essay(_) => NodeKind::Essay,
            Self::Code(_) => NodeKind::Code,
            Self::Check(_) => NodeKind::Check,
            Self::Radio(_) => NodeKind::Radio,
            Self::Drag(_) => NodeKind::Drag,
            Self::Drop(_) => NodeKind::Drop,
            Self::Image(_) => NodeKind::Image,
            Self::Graph(_) => NodeKind::Graph,
            Self::Solution(_) => NodeKind::Solution,
        }
    }

    /// The reconciliation key of this node, if it declares one.
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Self::Content(_) => None,
            Self::Variable(n) => Some(&n.var_name),
            Self::Input(n) => Some(&n.var_name),
            Self::Essay(n) => Some(&n.var_name),
            Self::Code(n) => Some(&n.var_name),
            Self::Check(n) => Some(&n.var_name),
            Self::Radio(n) => Some(&n.var_name),
            Self::Drag(n) => Some(&n.var_name),
            Self::Drop(n) => Some(&n.var_name),
            Self::Image(n) => Some(&n.var_name),
            Self::Graph(n) => Some(&n.var_name),
            Self::Solution(n) => Some(&n.var_name),
        }
    }

    /// Child nodes, for container kinds.
    pub fn children(&self) -> Option<&[AstNode]> {
        match self {
            Self::Check(n) => Some(&n.content),
            Self::Radio(n) => Some(&n.content),
            Self::Drag(n) => Some(&n.content),
            Self::Drop(n) => Some(&n.content),
            Self::Solution(n) => Some(&n.content),
            _ => None,
        }
    }
}

/// Node kind discriminant, used for structural queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Content,
    Variable,
    Input,
    Essay,
    Code,
    Check,
    Radio,
    Drag,
    Drop,
    Image,
    Graph,
    Solution,
}

// ── Node payloads ─────────────────────────────────────────────────────────────

/// Plain text / raw markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub content: String,
}

/// `[var]` — a variable placeholder with its compile-time value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    pub var_name: String,
    pub value: VariableValue,
}

/// `[input]` — a single-line answer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputNode {
    pub var_name: String,
}

/// `[essay]` — a multi-line text area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayNode {
    pub var_name: String,
}

/// `[code]` — a code editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeNode {
    pub var_name: String,
}

/// `[x]...[x]` — a checkbox wrapping its label content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckNode {
    pub var_name: String,
    pub content: Vec<AstNode>,
}

/// `[*]...[*]` — a radio button wrapping its label content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioNode {
    pub var_name: String,
    pub content: Vec<AstNode>,
}

/// A draggable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragNode {
    pub var_name: String,
    pub content: Vec<AstNode>,
}

/// A drop target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropNode {
    pub var_name: String,
    pub content: Vec<AstNode>,
}

/// An embedded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub var_name: String,
    pub src: String,
}

/// A function graph with its equation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub var_name: String,
    pub equations: Vec<String>,
}

/// The worked solution.
///
/// `inner_html` is the pre-serialized markup of the subtree, produced by
/// the external compiler at build time. The solution view substitutes it
/// wholesale as the document body instead of re-rendering node by node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionNode {
    pub var_name: String,
    pub content: Vec<AstNode>,
    pub inner_html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> AstNode {
        AstNode::Input(InputNode {
            var_name: name.into(),
        })
    }

    fn solution_with(content: Vec<AstNode>) -> AstNode {
        AstNode::Solution(SolutionNode {
            var_name: "solution1".into(),
            content,
            inner_html: "<p>worked solution</p>".into(),
        })
    }

    #[test]
    fn query_preserves_document_order() {
        let ast = DocumentAst::new(vec![input("a"), input("b"), input("c")]);
        let names: Vec<_> = ast
            .nodes_of_kind(NodeKind::Input, &[])
            .iter()
            .map(|n| n.var_name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn query_recurses_into_containers() {
        let ast = DocumentAst::new(vec![AstNode::Check(CheckNode {
            var_name: "check1".into(),
            content: vec![input("nested")],
        })]);
        assert_eq!(ast.nodes_of_kind(NodeKind::Input, &[]).len(), 1);
        assert_eq!(ast.nodes_of_kind(NodeKind::Check, &[]).len(), 1);
    }

    #[test]
    fn query_excludes_solution_subtree() {
        let ast = DocumentAst::new(vec![
            input("visible"),
            solution_with(vec![input("hidden")]),
        ]);
        let exercise = ast.nodes_of_kind(NodeKind::Input, &[NodeKind::Solution]);
        assert_eq!(exercise.len(), 1);
        assert_eq!(exercise[0].var_name(), Some("visible"));

        // Without the exclusion the nested input is visible again.
        let all = ast.nodes_of_kind(NodeKind::Input, &[]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn solution_lookup_takes_first_of_duplicates() {
        let second = AstNode::Solution(SolutionNode {
            var_name: "solution2".into(),
            content: vec![],
            inner_html: "<p>second</p>".into(),
        });
        let ast = DocumentAst::new(vec![solution_with(vec![]), second]);
        assert_eq!(ast.solution().unwrap().var_name, "solution1");
    }

    #[test]
    fn solution_lookup_none_when_absent() {
        let ast = DocumentAst::new(vec![input("x")]);
        assert!(ast.solution().is_none());
    }

    #[test]
    fn node_serialization_uses_kind_tags() {
        let node = input("x");
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"INPUT\""));
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
