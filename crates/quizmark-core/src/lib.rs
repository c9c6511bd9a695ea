//! The quizmark build-and-grade pipeline.
//!
//! ```text
//! source → builder → Built Question → renderer → displayed view
//!        → (learner interacts) → extractor → grader → verdict
//! ```
//!
//! The session controller owns the visible mode (exercise/solution),
//! decides when a rebuild is required, preserves in-progress answers
//! across mode switches, and emits lifecycle notifications. The markup
//! compiler and HTML sanitizer are consumed through trait seams; hosts
//! supply their implementations.

mod compile;
mod extract;
mod grade;
mod registry;
mod render;
mod sanitize;
mod session;
mod store;

pub use compile::{
    build_question, source_fingerprint, AnswerResolver, CompiledDocument, MarkupCompiler,
    VariableResolver,
};
pub use extract::{extract, ExtractionScope};
pub use grade::{grade, DEFAULT_GAS_LIMIT, EVAL_TIMEOUT};
pub use registry::{ViewRegistry, WidgetHandle};
pub use render::{render_exercise, render_mode, solution_fragment, UNSET_VARIABLE};
pub use sanitize::{PassthroughSanitizer, SanitizePolicy, Sanitizer, WIDGET_POLICY};
pub use session::{Notification, ResponseEvent, SessionController, SessionError};
pub use store::{SessionState, SessionStore, Update, ViewMode};
