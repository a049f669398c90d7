//! Error types for the command execution pipeline.

use crate::command::{AssignmentError, DefinitionError, PlayerError};
use crate::error::{ErrorSeverity, RosterError};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> PhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for PhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for PhaseError<E> {}

/// Errors surfaced while executing a command through the roster engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("player command failed: {0}")]
    Player(PhaseError<PlayerError>),

    #[error("team definition command failed: {0}")]
    Definition(PhaseError<DefinitionError>),

    #[error("assignment command failed: {0}")]
    Assignment(PhaseError<AssignmentError>),
}

impl ExecuteError {
    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::Player(e) => e.phase,
            Self::Definition(e) => e.phase,
            Self::Assignment(e) => e.phase,
        }
    }

    /// The assignment conflict behind this error, if any.
    pub fn as_assignment(&self) -> Option<&AssignmentError> {
        match self {
            Self::Assignment(e) => Some(&e.error),
            _ => None,
        }
    }

    /// True for slot-occupied and stale-reference rejections.
    pub fn is_conflict(&self) -> bool {
        self.as_assignment().is_some_and(AssignmentError::is_conflict)
    }
}

impl RosterError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        let inner = match self {
            Self::Player(e) => e.error.severity(),
            Self::Definition(e) => e.error.severity(),
            Self::Assignment(e) => e.error.severity(),
        };
        // A broken post-condition means apply already ran.
        if self.phase() == TransitionPhase::PostValidate {
            ErrorSeverity::Internal
        } else {
            inner
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Player(e) => e.error.error_code(),
            Self::Definition(e) => e.error.error_code(),
            Self::Assignment(e) => e.error.error_code(),
        }
    }
}
