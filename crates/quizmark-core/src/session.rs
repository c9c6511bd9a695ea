//! Session controller — the `Unset → Built(Exercise) ⇄ Built(Solution)`
//! state machine.
//!
//! Owns the visible mode, decides when a rebuild is required, preserves
//! in-progress answers across mode switches, and emits lifecycle
//! notifications. All state flows through the per-instance store; the
//! widget registry tracks the live view between renders.

use crate::compile::{build_question, MarkupCompiler};
use crate::extract::{extract, ExtractionScope};
use crate::grade::grade;
use crate::registry::ViewRegistry;
use crate::render::{render_exercise, solution_fragment};
use crate::sanitize::{Sanitizer, WIDGET_POLICY};
use crate::store::{SessionStore, Update, ViewMode};
use quizmark_types::{BuildError, QuestionSource, ResponseSet, Verdict};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// An operation invalid for the session's current state.
///
/// These are hard, state-preserving failures: the call is rejected and
/// the session is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `show_solution`, `show_exercise`, or `check_answer` before a
    /// successful build.
    #[error("no question has been built")]
    NotBuilt,
    /// `show_solution` on a question that declares no solution.
    #[error("question declares no solution")]
    NoSolution,
    /// `check_answer` while the solution view is displayed — grading
    /// always reads the live exercise widgets.
    #[error("cannot grade while the solution view is displayed")]
    SolutionDisplayed,
}

/// A lifecycle notification emitted to the host shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Notification {
    /// A view was rendered (either mode).
    QuestionBuilt,
    /// A rebuild produced visibly different output (or the first build).
    QuestionChanged,
    /// A check-answer pass completed.
    QuestionResponse(ResponseEvent),
}

/// Payload of [`Notification::QuestionResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub responses: ResponseSet,
    pub verdict: Verdict,
}

type Listener = Box<dyn FnMut(&Notification)>;

/// One question session.
///
/// Generic over the host-supplied markup compiler and sanitizer seams.
pub struct SessionController<C, S> {
    compiler: C,
    sanitizer: S,
    store: SessionStore,
    registry: ViewRegistry,
    listeners: Vec<Listener>,
}

impl<C, S> SessionController<C, S>
where
    C: MarkupCompiler,
    S: Sanitizer,
{
    pub fn new(compiler: C, sanitizer: S) -> Self {
        Self {
            compiler,
            sanitizer,
            store: SessionStore::new(),
            registry: ViewRegistry::new(),
            listeners: Vec::new(),
        }
    }

    // ── Host surface ──────────────────────────────────────────────────────

    /// Register a lifecycle listener.
    pub fn on_notification(&mut self, listener: impl FnMut(&Notification) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The current session state (read-only).
    pub fn state(&self) -> &crate::store::SessionState {
        self.store.state()
    }

    /// The currently displayed mode.
    pub fn mode(&self) -> ViewMode {
        self.store.state().mode
    }

    /// The displayed body, passed through the sanitizer with the widget
    /// allow-list. `None` before the first successful build.
    pub fn displayed_html(&self) -> Option<String> {
        self.store
            .state()
            .built_question
            .as_ref()
            .map(|built| self.sanitizer.sanitize(&built.html, &WIDGET_POLICY))
    }

    /// The live widget registry — the host writes learner interactions
    /// into it as they happen.
    pub fn registry_mut(&mut self) -> &mut ViewRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    // ── setQuestion ───────────────────────────────────────────────────────

    /// Submit a source pair.
    ///
    /// Returns `Ok(true)` when a rebuild ran, `Ok(false)` when the
    /// submission was structurally identical to the previous one (same
    /// markup AND same script) and was skipped — exactly one compile per
    /// distinct source, and no notification on the skip.
    pub async fn set_question(&mut self, markup: &str, script: &str) -> Result<bool, BuildError> {
        let question = QuestionSource::new(markup, script);
        self.store.dispatch(Update::QuestionSubmitted {
            question: Some(question.clone()),
        });

        if self.store.state().previous_question.as_ref() == Some(&question) {
            debug!("identical source resubmitted, rebuild skipped");
            return Ok(false);
        }

        let built = match build_question(&self.compiler, markup, script).await {
            Ok(built) => built,
            Err(err) => {
                // The previous Built Question stays displayed; nothing is
                // partially applied.
                error!(error = %err, "question build failed");
                return Err(err);
            }
        };

        let changed = match &self.store.state().built_question {
            None => true,
            Some(previous) => previous.html != built.html,
        };

        info!(fingerprint = %built.fingerprint, "question built");
        let ast = built.ast.clone();
        self.store.dispatch(Update::QuestionBuilt { built });
        self.registry.populate(&ast);

        self.notify(&Notification::QuestionBuilt);
        if changed {
            self.notify(&Notification::QuestionChanged);
        }
        Ok(true)
    }

    /// Drop the submitted question without touching the displayed view.
    pub fn clear_question(&mut self) {
        self.store
            .dispatch(Update::QuestionSubmitted { question: None });
    }

    // ── showSolution / showExercise ───────────────────────────────────────

    /// Switch to the solution view.
    ///
    /// Extracts the current responses from the live exercise view
    /// *before* swapping the displayed body, so the exercise can later be
    /// restored verbatim. Already showing the solution is a no-op —
    /// re-extracting from a widgetless view would clobber the saved
    /// responses.
    pub fn show_solution(&mut self) -> Result<(), SessionError> {
        let (fragment, responses) = {
            let state = self.store.state();
            let Some(built) = state.built_question.as_ref() else {
                return Err(SessionError::NotBuilt);
            };
            if state.mode == ViewMode::Solution {
                debug!("solution already displayed");
                return Ok(());
            }
            let Some(fragment) = solution_fragment(&built.ast) else {
                return Err(SessionError::NoSolution);
            };
            (
                fragment.to_string(),
                extract(&built.ast, &self.registry, ExtractionScope::Exercise),
            )
        };

        self.store.dispatch(Update::ResponsesSaved { responses });
        self.store.dispatch(Update::HtmlReplaced { html: fragment });
        self.store.dispatch(Update::ModeChanged {
            mode: ViewMode::Solution,
        });
        self.registry.clear();

        self.notify(&Notification::QuestionBuilt);
        Ok(())
    }

    /// Switch to (or re-render) the exercise view.
    ///
    /// Renders fresh blanks from the AST — not a restore of old HTML, so
    /// widget identities stay stable — then writes the saved responses
    /// back into the fresh widgets by `varName`.
    pub fn show_exercise(&mut self) -> Result<(), SessionError> {
        let ast = match self.store.state().built_question.as_ref() {
            Some(built) => built.ast.clone(),
            None => return Err(SessionError::NotBuilt),
        };

        let html = render_exercise(&self.compiler, &ast);
        self.store.dispatch(Update::HtmlReplaced { html });
        self.store.dispatch(Update::ModeChanged {
            mode: ViewMode::Exercise,
        });
        self.registry.populate(&ast);
        self.restore_saved_responses();

        self.notify(&Notification::QuestionBuilt);
        Ok(())
    }

    fn restore_saved_responses(&mut self) {
        let Some(saved) = self.store.state().saved_responses.clone() else {
            return;
        };
        for response in &saved.inputs {
            if !self.registry.set_text(&response.var_name, response.value.as_str()) {
                debug!(var_name = %response.var_name, "saved input has no widget to restore into");
            }
        }
        for response in &saved.essays {
            if !self.registry.set_text(&response.var_name, response.value.as_str()) {
                debug!(var_name = %response.var_name, "saved essay has no widget to restore into");
            }
        }
        for response in &saved.codes {
            if !self.registry.set_text(&response.var_name, response.value.as_str()) {
                debug!(var_name = %response.var_name, "saved code has no widget to restore into");
            }
        }
        for response in &saved.checks {
            if !self.registry.set_checked(&response.var_name, response.checked) {
                debug!(var_name = %response.var_name, "saved check has no widget to restore into");
            }
        }
        for response in &saved.radios {
            if !self.registry.set_checked(&response.var_name, response.checked) {
                debug!(var_name = %response.var_name, "saved radio has no widget to restore into");
            }
        }
    }

    // ── checkAnswer ───────────────────────────────────────────────────────

    /// Grade the live exercise view.
    ///
    /// Extraction then evaluation; session state is unchanged either way.
    pub async fn check_answer(&mut self) -> Result<Verdict, SessionError> {
        let (responses, verdict) = {
            let state = self.store.state();
            let Some(built) = state.built_question.as_ref() else {
                return Err(SessionError::NotBuilt);
            };
            if state.mode == ViewMode::Solution {
                return Err(SessionError::SolutionDisplayed);
            }
            let Some(question) = state.question.as_ref() else {
                return Err(SessionError::NotBuilt);
            };
            let responses = extract(&built.ast, &self.registry, ExtractionScope::Exercise);
            let verdict = grade(&question.script, built, &responses).await;
            (responses, verdict)
        };

        info!(outcome = ?verdict.outcome, "answer checked");
        self.notify(&Notification::QuestionResponse(ResponseEvent {
            responses,
            verdict: verdict.clone(),
        }));
        Ok(verdict)
    }

    fn notify(&mut self, notification: &Notification) {
        for listener in &mut self.listeners {
            listener(notification);
        }
    }
}
