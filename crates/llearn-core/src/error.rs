//! Error types for rule authoring, progress storage, and content lookup.
//!
//! None of these escape the evaluation or progress paths: the evaluator
//! fails closed and the progress store degrades to empty state. They exist
//! so authoring tools and storage backends can report what went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with an authored rule, found by [`Rule::check`](crate::model::Rule::check).
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule kind is not one of the five known kinds.
    #[error("unknown rule kind: {0}")]
    UnknownKind(String),

    /// The parameter type does not match what the kind expects.
    #[error("rule kind '{kind}' expects a {expected} parameter")]
    ParameterMismatch {
        kind: &'static str,
        expected: &'static str,
    },

    /// The regex parameter does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures reported by a progress storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage medium is present.
    #[error("storage is unavailable")]
    Unavailable,

    /// Reading or writing the backing file failed.
    #[error("storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content lookup failures, surfaced to callers as a not-found signal.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("lesson not found: {module}/{lesson}")]
    LessonNotFound { module: String, lesson: String },

    /// A lesson key was not of the form `module/lesson`.
    #[error("invalid lesson key '{0}', expected <module>/<lesson>")]
    InvalidLessonKey(String),
}

impl ContentError {
    /// Returns `true` if this error means the requested content does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::ModuleNotFound(_) | ContentError::LessonNotFound { .. }
        )
    }
}
