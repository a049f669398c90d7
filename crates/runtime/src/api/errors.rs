//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine rejections, worker coordination failures, repositories, and
//! the player generator so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use roster_core::{ExecuteError, RosterError, SchemaViolation};

use super::handle::SessionPhase;
use super::identity::Identity;
use super::providers::GeneratorError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("roster session is not ready ({0})")]
    NotReady(SessionPhase),

    #[error("command rejected: {0}")]
    Rejected(#[source] ExecuteError),

    #[error("invalid input: {}", describe(.0))]
    InvalidInput(Vec<SchemaViolation>),

    #[error("player generator not set")]
    GeneratorNotSet,

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a roster repository before building")]
    MissingRepository,

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("persistence worker stopped")]
    PersistenceStopped,

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("already logged in as {0}")]
    AlreadyLoggedIn(Identity),

    #[error("no identity is logged in")]
    NotLoggedIn,
}

impl RuntimeError {
    /// True for slot-occupied and stale-reference rejections, which a UI
    /// typically resolves by refreshing its view.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Rejected(e) if e.is_conflict())
    }

    /// Stable machine-readable code for engine rejections.
    pub fn rejection_code(&self) -> Option<&'static str> {
        match self {
            Self::Rejected(e) => Some(e.error_code()),
            _ => None,
        }
    }
}

fn describe(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
