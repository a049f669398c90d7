//! Client configuration loaded from the environment.
use std::env;
use std::path::PathBuf;

use roster_runtime::Identity;

/// Settings for the composition root.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whose roster to open.
    pub identity: Identity,
    /// Directory holding one JSON roster per identity.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    pub const DEFAULT_IDENTITY: &'static str = "local";

    /// Environment variables:
    /// - `ROSTER_IDENTITY` - Identity to log in as (default: `local`)
    /// - `ROSTER_DATA_DIR` - Roster storage directory
    ///   (default: platform data dir, e.g. `~/.local/share/roster/rosters`)
    pub fn from_env() -> Self {
        let identity = env::var("ROSTER_IDENTITY")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .map(Identity::from)
            .unwrap_or_else(|| Identity::new(Self::DEFAULT_IDENTITY));

        let data_dir = env::var_os("ROSTER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self { identity, data_dir }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "roster")
        .map(|dirs| dirs.data_dir().join("rosters"))
        .unwrap_or_else(|| PathBuf::from("./roster_data"))
}
