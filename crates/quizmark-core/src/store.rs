//! Per-instance session store.
//!
//! Single-writer, multi-reader: every mutation is a discrete named
//! [`Update`] applied through [`SessionStore::dispatch`], and
//! subscribers are notified synchronously after each write completes.
//! Nothing here is shared across instances.

use quizmark_types::{BuiltQuestion, QuestionSource, ResponseSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which view the session currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Exercise,
    Solution,
}

/// Everything one question session tracks.
///
/// Created on instance attachment, mutated only through dispatched
/// updates, discarded on detachment.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub question: Option<QuestionSource>,
    pub previous_question: Option<QuestionSource>,
    pub built_question: Option<BuiltQuestion>,
    pub previous_built_question: Option<BuiltQuestion>,
    pub mode: ViewMode,
    pub saved_responses: Option<ResponseSet>,
}

/// A named state mutation.
#[derive(Debug, Clone)]
pub enum Update {
    /// A source pair was submitted: the current question becomes the
    /// previous one, whether or not a rebuild follows.
    QuestionSubmitted { question: Option<QuestionSource> },
    /// A rebuild succeeded: the current Built Question becomes the
    /// previous one, the new one is applied wholesale, the view returns
    /// to a blank exercise, and retained responses are dropped.
    QuestionBuilt { built: BuiltQuestion },
    /// The displayed body changed without a rebuild (mode switch or
    /// exercise re-render).
    HtmlReplaced { html: String },
    /// The visible mode changed.
    ModeChanged { mode: ViewMode },
    /// In-progress responses were captured before leaving the exercise
    /// view.
    ResponsesSaved { responses: ResponseSet },
}

impl Update {
    /// Update name, for logs and subscriber filtering.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QuestionSubmitted { .. } => "question-submitted",
            Self::QuestionBuilt { .. } => "question-built",
            Self::HtmlReplaced { .. } => "html-replaced",
            Self::ModeChanged { .. } => "mode-changed",
            Self::ResponsesSaved { .. } => "responses-saved",
        }
    }
}

type Subscriber = Box<dyn FnMut(&SessionState, &Update)>;

/// The per-instance state container.
#[derive(Default)]
pub struct SessionStore {
    state: SessionState,
    subscribers: Vec<Subscriber>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Register a read-only subscriber, notified after every write.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&SessionState, &Update) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Apply one named update, then notify subscribers synchronously.
    pub fn dispatch(&mut self, update: Update) {
        trace!(update = update.name(), "dispatch");
        self.apply(&update);
        for subscriber in &mut self.subscribers {
            subscriber(&self.state, &update);
        }
    }

    fn apply(&mut self, update: &Update) {
        match update {
            Update::QuestionSubmitted { question } => {
                self.state.previous_question = self.state.question.take();
                self.state.question = question.clone();
            }
            Update::QuestionBuilt { built } => {
                self.state.previous_built_question = self.state.built_question.take();
                self.state.built_question = Some(built.clone());
                self.state.mode = ViewMode::Exercise;
                self.state.saved_responses = None;
            }
            Update::HtmlReplaced { html } => {
                // Replace the whole artifact rather than mutating in place.
                if let Some(built) = &self.state.built_question {
                    let mut next = built.clone();
                    next.html = html.clone();
                    self.state.built_question = Some(next);
                }
            }
            Update::ModeChanged { mode } => {
                self.state.mode = *mode;
            }
            Update::ResponsesSaved { responses } => {
                self.state.saved_responses = Some(responses.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_types::DocumentAst;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn built(html: &str) -> BuiltQuestion {
        BuiltQuestion {
            ast: DocumentAst::default(),
            html: html.into(),
            original_variable_values: BTreeMap::new(),
            fingerprint: "f".into(),
            graded_inputs: vec![],
            graded_checks: vec![],
            graded_radios: vec![],
        }
    }

    #[test]
    fn question_submission_shifts_previous() {
        let mut store = SessionStore::new();
        let first = QuestionSource::new("[a]", "answer = true");
        store.dispatch(Update::QuestionSubmitted {
            question: Some(first.clone()),
        });
        let second = QuestionSource::new("[b]", "answer = true");
        store.dispatch(Update::QuestionSubmitted {
            question: Some(second.clone()),
        });
        assert_eq!(store.state().previous_question.as_ref(), Some(&first));
        assert_eq!(store.state().question.as_ref(), Some(&second));
    }

    #[test]
    fn build_resets_mode_and_saved_responses() {
        let mut store = SessionStore::new();
        store.dispatch(Update::QuestionBuilt { built: built("a") });
        store.dispatch(Update::ModeChanged {
            mode: ViewMode::Solution,
        });
        store.dispatch(Update::ResponsesSaved {
            responses: ResponseSet::default(),
        });
        store.dispatch(Update::QuestionBuilt { built: built("b") });

        let state = store.state();
        assert_eq!(state.mode, ViewMode::Exercise);
        assert!(state.saved_responses.is_none());
        assert_eq!(state.built_question.as_ref().unwrap().html, "b");
        assert_eq!(state.previous_built_question.as_ref().unwrap().html, "a");
    }

    #[test]
    fn html_replacement_swaps_the_artifact_wholesale() {
        let mut store = SessionStore::new();
        store.dispatch(Update::QuestionBuilt { built: built("a") });
        store.dispatch(Update::HtmlReplaced { html: "b".into() });
        assert_eq!(store.state().built_question.as_ref().unwrap().html, "b");
    }

    #[test]
    fn subscribers_run_synchronously_after_each_write() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut store = SessionStore::new();
        store.subscribe(move |state, update| {
            log.borrow_mut()
                .push((update.name(), state.question.is_some()));
        });
        store.dispatch(Update::QuestionSubmitted {
            question: Some(QuestionSource::new("[a]", "")),
        });
        // The subscriber observed the already-applied state.
        assert_eq!(&*seen.borrow(), &[("question-submitted", true)]);
    }
}
