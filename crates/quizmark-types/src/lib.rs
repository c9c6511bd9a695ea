//! Shared types for the quizmark pipeline.
//!
//! This crate defines the document AST node types, answer declarations,
//! user response records, verdicts, and the build error taxonomy shared
//! across the compiler, extractor, and session crates.

mod error;
mod question;
pub mod ast;
pub mod answer;

pub use answer::{
    Outcome, ResponseSet, UserCheck, UserCode, UserEssay, UserGraph, UserImage, UserInput,
    UserRadio, UserVariable, Verdict,
};
pub use ast::{
    AstNode, CheckNode, CodeNode, ContentNode, DocumentAst, DragNode, DropNode, EssayNode,
    GraphNode, ImageNode, InputNode, NodeKind, RadioNode, SolutionNode, VariableNode,
};
pub use error::BuildError;
pub use question::{BuiltQuestion, QuestionSource, VariableValue};

/// Result type used throughout the quizmark pipeline for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
