//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients. It drives the session lifecycle:
//! `login` loads an identity's roster and starts its persistence worker,
//! `logout` flushes and tears both down again.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use roster_core::RosterState;

use crate::api::{Identity, PlayerGenerator, Result, RuntimeError, SessionHandle, SessionStatus};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, SessionEvent, Topic};
use crate::repository::RosterRepository;
use crate::workers::{Command, PersistenceWorker, SavePolicy, SessionWorker};

struct ActivePersistence {
    identity: Identity,
    worker: JoinHandle<()>,
}

/// Main runtime that orchestrates the roster session
///
/// Runtime owns workers and coordinates login / logout.
/// [`SessionHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    config: RuntimeConfig,
    handle: SessionHandle,
    command_tx: mpsc::Sender<Command>,
    repository: Arc<dyn RosterRepository>,
    event_bus: EventBus,

    // Background workers
    session_worker: JoinHandle<()>,
    persistence: Option<ActivePersistence>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to the session
    ///
    /// The handle can be shared across clients and async tasks. Before
    /// [`login`](Self::login) every roster call fails with `NotReady`.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Identity of the active session, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.persistence.as_ref().map(|p| &p.identity)
    }

    /// Load the roster stored for `identity` and make the session ready.
    ///
    /// A missing roster starts empty. A failing load also starts empty but
    /// marks the session as degraded (`load_failed`); later changes are
    /// still saved.
    pub async fn login(&mut self, identity: Identity) -> Result<SessionStatus> {
        if let Some(active) = &self.persistence {
            return Err(RuntimeError::AlreadyLoggedIn(active.identity.clone()));
        }

        self.handle.begin_load(identity.clone()).await?;

        let (state, load_failed) = match self.repository.load(&identity).await {
            Ok(Some(snapshot)) => (RosterState::from_snapshot(snapshot), false),
            Ok(None) => {
                info!(
                    target: "roster::runtime",
                    identity = %identity,
                    "no stored roster, starting empty"
                );
                (RosterState::new(), false)
            }
            Err(e) => {
                warn!(
                    target: "roster::runtime",
                    identity = %identity,
                    "failed to load roster, starting empty: {}",
                    e
                );
                (RosterState::new(), true)
            }
        };

        let (worker, link) = PersistenceWorker::new(
            identity.clone(),
            state.snapshot(),
            Arc::clone(&self.repository),
            self.event_bus.clone(),
            SavePolicy::from_config(&self.config),
        );
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        if let Err(e) = self.handle.activate(state, load_failed, link).await {
            // The link went down with the rejected command; the worker exits.
            let _ = self.handle.reset().await;
            let _ = worker.await;
            return Err(e);
        }

        self.persistence = Some(ActivePersistence {
            identity: identity.clone(),
            worker,
        });

        self.event_bus.publish(Event::Session(SessionEvent::Loaded {
            identity: identity.clone(),
            load_failed,
        }));
        info!(target: "roster::runtime", identity = %identity, load_failed, "logged in");

        self.handle.status().await
    }

    /// Save pending changes and return the session to `NotReady`.
    ///
    /// A failing final save is logged and published but does not keep the
    /// session open.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(active) = self.persistence.take() else {
            return Err(RuntimeError::NotLoggedIn);
        };

        if let Err(e) = self.handle.flush().await {
            warn!(
                target: "roster::runtime",
                identity = %active.identity,
                "final flush before logout failed: {}",
                e
            );
        }

        self.handle.reset().await?;
        active.worker.await.map_err(RuntimeError::WorkerJoin)?;

        self.event_bus.publish(Event::Session(SessionEvent::LoggedOut {
            identity: active.identity.clone(),
        }));
        info!(target: "roster::runtime", identity = %active.identity, "logged out");
        Ok(())
    }

    /// Shutdown the runtime gracefully
    ///
    /// Logs out first if a session is active, so pending changes are saved.
    pub async fn shutdown(mut self) -> Result<()> {
        if self.persistence.is_some() {
            self.logout().await?;
        }

        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        drop(self.handle);

        self.session_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    repository: Option<Arc<dyn RosterRepository>>,
    generator: Option<Arc<dyn PlayerGenerator>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repository: None,
            generator: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Storage for rosters (required)
    pub fn repository(mut self, repository: impl RosterRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Share an existing repository instance
    pub fn shared_repository(mut self, repository: Arc<dyn RosterRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Player generator used by [`SessionHandle::generate_players`]
    pub fn generator(mut self, generator: impl PlayerGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Build the runtime
    ///
    /// Spawns the session worker, so it must be called inside a Tokio
    /// runtime.
    pub fn build(self) -> Result<Runtime> {
        let repository = self.repository.ok_or(RuntimeError::MissingRepository)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = SessionHandle::new(command_tx.clone(), event_bus.clone(), self.generator);

        let session_worker =
            SessionWorker::new(self.config.roster.clone(), command_rx, event_bus.clone());
        let session_worker = tokio::spawn(async move {
            session_worker.run().await;
        });

        Ok(Runtime {
            config: self.config,
            handle,
            command_tx,
            repository,
            event_bus,
            session_worker,
            persistence: None,
        })
    }
}
