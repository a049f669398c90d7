//! Async runtime around the deterministic roster engine.
//!
//! This crate wires together the roster engine, repositories, the player
//! generator abstraction, and worker tasks into a cohesive runtime API.
//! Consumers embed [`Runtime`] to log identities in and out, subscribe to
//! events, and edit the roster through [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`config`] loads tunables from the environment
//! - [`repository`] provides storage adapters for rosters
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    FixedGenerator, GeneratorError, Identity, PlayerGenerator, Result, RuntimeError,
    SessionHandle, SessionPhase, SessionStatus,
};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, PersistenceEvent, RosterEvent, SessionEvent, Topic};
pub use repository::{
    FileRosterRepository, InMemoryRosterRepo, RepositoryError, RosterRepository,
};
pub use runtime::{Runtime, RuntimeBuilder};
