//! Background saving of the logged-in roster.
//!
//! The session worker publishes every state-changing revision on a `watch`
//! channel. The persistence worker waits until no new revision arrives for
//! the debounce window, then saves only the latest one. Revisions that land
//! while a save is in flight are picked up by the next save; nothing is
//! written twice and no change is lost.
//!
//! Failed saves are retried with exponential backoff. When every attempt
//! fails the worker publishes [`PersistenceEvent::SaveFailed`] and keeps
//! running; the in-memory roster stays authoritative.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use roster_core::RosterSnapshot;

use crate::api::{Identity, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, PersistenceEvent};
use crate::repository::RosterRepository;

/// Pending flushes queued ahead of the worker.
const FLUSH_BUFFER_SIZE: usize = 4;

/// A numbered roster state. Revision 0 is the state as loaded.
#[derive(Clone, Debug)]
pub(crate) struct Revision {
    pub number: u64,
    pub snapshot: Arc<RosterSnapshot>,
}

/// Request to save the latest revision immediately.
pub(crate) struct FlushRequest {
    pub reply: oneshot::Sender<Result<()>>,
}

/// Session-side end of the persistence channels.
///
/// Dropping the link stops the worker after a final save.
pub(crate) struct PersistenceLink {
    revisions: watch::Sender<Revision>,
    flush_tx: mpsc::Sender<FlushRequest>,
}

impl PersistenceLink {
    /// Records a new revision. Never blocks; older unsaved revisions are
    /// superseded.
    pub fn publish(&self, number: u64, snapshot: RosterSnapshot) {
        self.revisions.send_replace(Revision {
            number,
            snapshot: Arc::new(snapshot),
        });
    }

    /// Hands a flush request to the worker.
    ///
    /// If the worker is gone the request is answered with
    /// [`RuntimeError::PersistenceStopped`].
    pub async fn flush(&self, reply: oneshot::Sender<Result<()>>) {
        if let Err(mpsc::error::SendError(request)) =
            self.flush_tx.send(FlushRequest { reply }).await
        {
            let _ = request.reply.send(Err(RuntimeError::PersistenceStopped));
        }
    }
}

/// Retry and debounce timings for background saves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SavePolicy {
    pub debounce: Duration,
    /// Attempts per save, first try included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl SavePolicy {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            debounce: config.save_debounce,
            max_attempts: config.save_max_retries.max(1),
            base_delay: config.retry_base_delay,
        }
    }

    /// Delay after the given failed attempt (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Background worker that saves one identity's roster.
pub(crate) struct PersistenceWorker {
    identity: Identity,
    repository: Arc<dyn RosterRepository>,
    revisions: watch::Receiver<Revision>,
    flush_rx: mpsc::Receiver<FlushRequest>,
    event_bus: EventBus,
    policy: SavePolicy,
    /// Highest revision known to be stored.
    saved: u64,
}

impl PersistenceWorker {
    /// Creates the worker and the link the session uses to feed it.
    ///
    /// `initial` is the state as loaded; it counts as already saved.
    pub fn new(
        identity: Identity,
        initial: RosterSnapshot,
        repository: Arc<dyn RosterRepository>,
        event_bus: EventBus,
        policy: SavePolicy,
    ) -> (Self, PersistenceLink) {
        let (revisions_tx, revisions_rx) = watch::channel(Revision {
            number: 0,
            snapshot: Arc::new(initial),
        });
        let (flush_tx, flush_rx) = mpsc::channel(FLUSH_BUFFER_SIZE);

        let worker = Self {
            identity,
            repository,
            revisions: revisions_rx,
            flush_rx,
            event_bus,
            policy,
            saved: 0,
        };
        let link = PersistenceLink {
            revisions: revisions_tx,
            flush_tx,
        };
        (worker, link)
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(
            target: "roster::persistence",
            identity = %self.identity,
            debounce = ?self.policy.debounce,
            "persistence worker started"
        );

        loop {
            tokio::select! {
                changed = self.revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let pending = self.settle().await;
                    let result = self.save_latest().await;
                    if let Some(request) = pending
                        && request.reply.send(result).is_err()
                    {
                        debug!(
                            target: "roster::persistence",
                            "flush reply channel closed (caller dropped)"
                        );
                    }
                }
                Some(request) = self.flush_rx.recv() => {
                    let result = self.save_latest().await;
                    if request.reply.send(result).is_err() {
                        debug!(
                            target: "roster::persistence",
                            "flush reply channel closed (caller dropped)"
                        );
                    }
                }
                else => break,
            }
        }

        if let Err(e) = self.save_latest().await {
            error!(
                target: "roster::persistence",
                identity = %self.identity,
                error = %e,
                "final save failed"
            );
        }

        info!(
            target: "roster::persistence",
            identity = %self.identity,
            "persistence worker stopped"
        );
    }

    /// Waits until revisions stop arriving for the debounce window.
    ///
    /// Returns early with a flush request if one arrives meanwhile, or when
    /// the session side closes.
    async fn settle(&mut self) -> Option<FlushRequest> {
        loop {
            tokio::select! {
                changed = self.revisions.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
                Some(request) = self.flush_rx.recv() => return Some(request),
                _ = sleep(self.policy.debounce) => return None,
            }
        }
    }

    /// Saves the newest revision unless it is already stored.
    ///
    /// Every retry re-reads the channel, so a retry after a burst writes the
    /// newest state rather than the one that failed.
    async fn save_latest(&mut self) -> Result<()> {
        let mut attempt = 0;

        loop {
            let revision = self.revisions.borrow_and_update().clone();
            if revision.number <= self.saved {
                return Ok(());
            }
            attempt += 1;

            match self
                .repository
                .save(&self.identity, &revision.snapshot)
                .await
            {
                Ok(()) => {
                    if attempt > 1 {
                        info!(
                            target: "roster::persistence",
                            revision = revision.number,
                            "roster saved after {} retries",
                            attempt - 1
                        );
                    }
                    self.saved = revision.number;
                    debug!(
                        target: "roster::persistence",
                        identity = %self.identity,
                        revision = revision.number,
                        "roster saved"
                    );
                    self.event_bus
                        .publish(Event::Persistence(PersistenceEvent::Saved {
                            identity: self.identity.clone(),
                            revision: revision.number,
                        }));
                    return Ok(());
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        target: "roster::persistence",
                        revision = revision.number,
                        "failed to save roster (attempt {}/{}): {}. Retrying in {:?}...",
                        attempt,
                        self.policy.max_attempts,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        target: "roster::persistence",
                        identity = %self.identity,
                        revision = revision.number,
                        "failed to save roster after {} attempts: {}",
                        attempt,
                        e
                    );
                    self.event_bus
                        .publish(Event::Persistence(PersistenceEvent::SaveFailed {
                            identity: self.identity.clone(),
                            revision: revision.number,
                            message: e.to_string(),
                            attempts: attempt,
                        }));
                    return Err(RuntimeError::Repository(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_base_delay() {
        let policy = SavePolicy {
            debounce: Duration::from_millis(500),
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
    }

    #[test]
    fn policy_always_allows_one_attempt() {
        let config = RuntimeConfig {
            save_max_retries: 0,
            ..RuntimeConfig::default()
        };
        assert_eq!(SavePolicy::from_config(&config).max_attempts, 1);
    }
}
