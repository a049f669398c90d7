//! Repository contract for loading and saving a user's roster.

use async_trait::async_trait;
use roster_core::RosterSnapshot;

use super::error::Result;
use crate::api::Identity;

/// Durable store for roster snapshots, keyed by identity.
///
/// The runtime never blocks commands on `save`; writes are debounced and
/// retried by the persistence worker.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Returns `None` when nothing has been stored for `identity` yet.
    async fn load(&self, identity: &Identity) -> Result<Option<RosterSnapshot>>;

    async fn save(&self, identity: &Identity, snapshot: &RosterSnapshot) -> Result<()>;
}
