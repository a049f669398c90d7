//! Repository layer for persisted rosters.
//!
//! Each identity owns one [`RosterSnapshot`](roster_core::RosterSnapshot).
//! Derived data (unassigned players, reports) is never stored.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRosterRepository;
pub use memory::InMemoryRosterRepo;
pub use traits::RosterRepository;
