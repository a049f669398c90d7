//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need (e.g. a status bar only cares about persistence).

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{PersistenceEvent, RosterEvent, SessionEvent};
