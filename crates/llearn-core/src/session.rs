//! Exercise session state machine.
//!
//! A session lives for as long as a learner has one exercise open. It owns
//! the text buffer, the last outcome, the attempt counter, and the
//! hint/solution reveal state. None of it is persisted; only completion is
//! written through to the [`ProgressStore`].
//!
//! ```text
//! Editing --check--> Checked --edit--> Editing
//!    |                  |
//!    +----check(pass)---+--check(pass)--> Passed (terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{Exercise, Lesson, LessonKey};
use crate::progress::ProgressStore;
use crate::validation::{validate, ValidationOutcome};

/// Default, and minimum, number of checks before the sample solution can be
/// revealed.
pub const DEFAULT_SOLUTION_THRESHOLD: u32 = 2;

/// Tunables for an exercise session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Checks required before [`ExerciseSession::reveal_solution`] is allowed.
    /// Values below [`DEFAULT_SOLUTION_THRESHOLD`] are raised to it.
    pub solution_after_attempts: u32,
}

impl SessionConfig {
    /// The effective reveal threshold, never below the default.
    pub fn solution_threshold(&self) -> u32 {
        self.solution_after_attempts.max(DEFAULT_SOLUTION_THRESHOLD)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            solution_after_attempts: DEFAULT_SOLUTION_THRESHOLD,
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Initial state, and the state after any edit following a failed check.
    Editing,
    /// The last check failed and the text has not changed since.
    Checked,
    /// Every rule passed. Stays passed for the rest of the session.
    Passed,
}

/// Receives session events for the presentation layer.
pub trait SessionObserver {
    fn on_checked(&self, _outcome: &ValidationOutcome, _attempt: u32) {}
    fn on_completed(&self, _lesson: &LessonKey) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// What the presentation layer needs to render a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub lesson: LessonKey,
    pub state: SessionState,
    pub attempts: u32,
    pub hints_revealed: usize,
    pub hints_total: usize,
    pub solution_available: bool,
    pub solution_revealed: bool,
    pub last_outcome: Option<ValidationOutcome>,
}

/// One learner working on one exercise.
pub struct ExerciseSession<'a> {
    key: LessonKey,
    exercise: &'a Exercise,
    config: SessionConfig,
    text: String,
    state: SessionState,
    last_outcome: Option<ValidationOutcome>,
    attempts: u32,
    hints_revealed: usize,
    solution_revealed: bool,
}

impl<'a> ExerciseSession<'a> {
    /// Open a session on a lesson's exercise, starting from its starter text.
    pub fn new(module: &str, lesson: &'a Lesson) -> Self {
        Self::with_config(module, lesson, SessionConfig::default())
    }

    pub fn with_config(module: &str, lesson: &'a Lesson, config: SessionConfig) -> Self {
        Self {
            key: LessonKey::new(module, lesson.slug.as_str()),
            exercise: &lesson.exercise,
            config,
            text: lesson.exercise.starter_text.clone(),
            state: SessionState::Editing,
            last_outcome: None,
            attempts: 0,
            hints_revealed: 0,
            solution_revealed: false,
        }
    }

    /// Replace the text buffer.
    ///
    /// A failed check goes back to `Editing`; a passed session stays passed.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if self.state == SessionState::Checked {
            self.state = SessionState::Editing;
        }
    }

    /// Validate the current text.
    ///
    /// Returns `None` without doing anything once the session has passed.
    /// Otherwise counts an attempt, stores the outcome, and on success marks
    /// the lesson complete in `store` and notifies `observer`.
    pub fn check(
        &mut self,
        store: &mut dyn ProgressStore,
        observer: &dyn SessionObserver,
    ) -> Option<&ValidationOutcome> {
        if self.state == SessionState::Passed {
            return None;
        }

        let outcome = validate(&self.text, &self.exercise.rules);
        self.attempts += 1;
        observer.on_checked(&outcome, self.attempts);

        if outcome.overall_passed {
            self.state = SessionState::Passed;
            store.mark_lesson_complete(&self.key.module, &self.key.lesson);
            tracing::info!("{} passed after {} attempt(s)", self.key, self.attempts);
            observer.on_completed(&self.key);
        } else {
            self.state = SessionState::Checked;
        }

        self.last_outcome = Some(outcome);
        self.last_outcome.as_ref()
    }

    /// Reveal the next hint, returning it. `None` once every hint is shown.
    pub fn reveal_hint(&mut self) -> Option<&str> {
        let hint = self.exercise.hints.get(self.hints_revealed)?;
        self.hints_revealed += 1;
        Some(hint.as_str())
    }

    /// Whether enough attempts have been made to reveal the solution.
    pub fn can_reveal_solution(&self) -> bool {
        self.attempts >= self.config.solution_threshold()
    }

    /// Reveal the sample solution. `None` while still gated.
    pub fn reveal_solution(&mut self) -> Option<&str> {
        if !self.solution_revealed && !self.can_reveal_solution() {
            return None;
        }
        self.solution_revealed = true;
        Some(self.exercise.sample_solution.as_str())
    }

    pub fn lesson(&self) -> &LessonKey {
        &self.key
    }

    pub fn exercise(&self) -> &Exercise {
        self.exercise
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_passed(&self) -> bool {
        self.state == SessionState::Passed
    }

    pub fn last_outcome(&self) -> Option<&ValidationOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    /// Hints revealed so far, in order.
    pub fn revealed_hints(&self) -> &[String] {
        &self.exercise.hints[..self.hints_revealed]
    }

    pub fn has_more_hints(&self) -> bool {
        self.hints_revealed < self.exercise.hints.len()
    }

    pub fn solution_revealed(&self) -> bool {
        self.solution_revealed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            lesson: self.key.clone(),
            state: self.state,
            attempts: self.attempts,
            hints_revealed: self.hints_revealed,
            hints_total: self.exercise.hints.len(),
            solution_available: self.can_reveal_solution(),
            solution_revealed: self.solution_revealed,
            last_outcome: self.last_outcome.clone(),
        }
    }
}
