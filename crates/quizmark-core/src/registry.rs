//! Live widget registry.
//!
//! An explicit `varName -> widget handle` mapping standing in for
//! lookups into a live rendered tree. Populated from the AST at render
//! time and invalidated on every re-render; the host writes learner
//! interactions into the handles, extraction reads them back verbatim.

use quizmark_types::{DocumentAst, NodeKind};
use std::collections::BTreeMap;

/// The live state of one rendered answer widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetHandle {
    /// Inputs, essays, and code editors carry text.
    Text { value: String },
    /// Checkboxes and radios carry a checked flag.
    Toggle { checked: bool },
}

/// Registry of the widgets present in the currently rendered view.
///
/// Duplicate `varName`s overwrite in document order, so the last
/// declaration wins — the same degenerate a live-tree lookup would
/// resolve to.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    widgets: BTreeMap<String, WidgetHandle>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry for a freshly rendered exercise view.
    ///
    /// Registers one blank handle per interactive declaration outside
    /// the solution subtree.
    pub fn populate(&mut self, ast: &DocumentAst) {
        self.widgets.clear();
        for kind in [NodeKind::Input, NodeKind::Essay, NodeKind::Code] {
            for node in ast.nodes_of_kind(kind, &[NodeKind::Solution]) {
                if let Some(name) = node.var_name() {
                    self.widgets.insert(
                        name.to_string(),
                        WidgetHandle::Text {
                            value: String::new(),
                        },
                    );
                }
            }
        }
        for kind in [NodeKind::Check, NodeKind::Radio] {
            for node in ast.nodes_of_kind(kind, &[NodeKind::Solution]) {
                if let Some(name) = node.var_name() {
                    self.widgets
                        .insert(name.to_string(), WidgetHandle::Toggle { checked: false });
                }
            }
        }
    }

    /// Drop every handle — the rendered view no longer shows widgets.
    pub fn clear(&mut self) {
        self.widgets.clear();
    }

    pub fn contains(&self, var_name: &str) -> bool {
        self.widgets.contains_key(var_name)
    }

    /// Read a text widget's current value.
    pub fn text(&self, var_name: &str) -> Option<&str> {
        match self.widgets.get(var_name) {
            Some(WidgetHandle::Text { value }) => Some(value),
            _ => None,
        }
    }

    /// Read a toggle widget's checked state.
    pub fn checked(&self, var_name: &str) -> Option<bool> {
        match self.widgets.get(var_name) {
            Some(WidgetHandle::Toggle { checked }) => Some(*checked),
            _ => None,
        }
    }

    /// Write a text widget. Returns `false` if no text widget has this name.
    pub fn set_text(&mut self, var_name: &str, value: impl Into<String>) -> bool {
        match self.widgets.get_mut(var_name) {
            Some(WidgetHandle::Text { value: slot }) => {
                *slot = value.into();
                true
            }
            _ => false,
        }
    }

    /// Write a toggle widget. Returns `false` if no toggle widget has this name.
    pub fn set_checked(&mut self, var_name: &str, checked: bool) -> bool {
        match self.widgets.get_mut(var_name) {
            Some(WidgetHandle::Toggle { checked: slot }) => {
                *slot = checked;
                true
            }
            _ => false,
        }
    }
}
