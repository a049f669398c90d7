//! In-memory RosterRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use roster_core::RosterSnapshot;

use crate::api::Identity;
use crate::repository::{RepositoryError, Result, RosterRepository};

/// In-memory implementation of [`RosterRepository`].
///
/// Supports failure injection and an artificial save latency so the
/// persistence worker's retry and single-flight behaviour can be exercised.
#[derive(Default)]
pub struct InMemoryRosterRepo {
    rosters: RwLock<HashMap<Identity, RosterSnapshot>>,
    fail_loads: AtomicBool,
    failing_saves: AtomicU32,
    save_attempts: AtomicUsize,
    saves: AtomicUsize,
    save_delay: Option<Duration>,
}

impl InMemoryRosterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save sleeps for `delay` before storing.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    /// Seeds a stored roster.
    pub fn insert(&self, identity: Identity, snapshot: RosterSnapshot) -> Result<()> {
        self.rosters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .insert(identity, snapshot);
        Ok(())
    }

    pub fn stored(&self, identity: &Identity) -> Result<Option<RosterSnapshot>> {
        let rosters = self
            .rosters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rosters.get(identity).cloned())
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// The next `count` save calls fail with [`RepositoryError::Unavailable`].
    pub fn fail_next_saves(&self, count: u32) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Save calls so far, failed ones included.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterRepository for InMemoryRosterRepo {
    async fn load(&self, identity: &Identity) -> Result<Option<RosterSnapshot>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(format!(
                "load of {identity} refused"
            )));
        }
        self.stored(identity)
    }

    async fn save(&self, identity: &Identity, snapshot: &RosterSnapshot) -> Result<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(RepositoryError::Unavailable(format!(
                "save of {identity} refused"
            )));
        }

        self.insert(identity.clone(), snapshot.clone())?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
