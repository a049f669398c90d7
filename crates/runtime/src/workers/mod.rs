//! Worker tasks that back the runtime orchestration.
//!
//! The session worker owns the authoritative roster and executes commands;
//! the persistence worker saves settled revisions in the background.

mod persistence;
mod session;

pub(crate) use persistence::{PersistenceLink, PersistenceWorker, SavePolicy};
pub(crate) use session::{Command, SessionWorker};
