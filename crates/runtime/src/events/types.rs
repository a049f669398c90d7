use roster_core::ChangeSet;
use serde::{Deserialize, Serialize};

use crate::api::Identity;

/// Roster mutations and rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterEvent {
    /// A command changed the roster; `revision` is the new state's number.
    StateChanged {
        revision: u64,
        command: String,
        changes: ChangeSet,
    },
    /// A command was refused and the roster left untouched.
    CommandRejected {
        command: String,
        code: String,
        message: String,
    },
}

/// Outcome of background saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    Saved {
        identity: Identity,
        revision: u64,
    },
    /// Every retry for `revision` failed. The in-memory roster is kept and the
    /// next change triggers another save.
    SaveFailed {
        identity: Identity,
        revision: u64,
        message: String,
        attempts: u32,
    },
}

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The roster for `identity` is ready. `load_failed` marks a degraded,
    /// empty session after a failed load.
    Loaded { identity: Identity, load_failed: bool },
    LoggedOut { identity: Identity },
}
