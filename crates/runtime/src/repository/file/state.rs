//! File-based RosterRepository implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roster_core::RosterSnapshot;
use tokio::fs;

use crate::api::Identity;
use crate::repository::{RepositoryError, Result, RosterRepository};

/// Stores one pretty-printed JSON document per identity.
///
/// # File Format
///
/// `{base_dir}/{encoded identity}.json`. The identity is encoded so that any
/// string maps to a distinct, portable file name: ASCII letters, digits and
/// `-` are kept, every other byte becomes `_xx` (lowercase hex).
///
/// Writes go to a `.json.tmp` sibling first and are then renamed over the
/// target, so a crash never leaves a half-written roster behind.
pub struct FileRosterRepository {
    base_dir: PathBuf,
}

impl FileRosterRepository {
    /// Create a new file-based roster repository rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to an identity's roster file.
    pub fn roster_path(&self, identity: &Identity) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", encode_identity(identity)))
    }
}

fn encode_identity(identity: &Identity) -> String {
    let mut encoded = String::with_capacity(identity.as_str().len());
    for byte in identity.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("_{byte:02x}"));
        }
    }
    encoded
}

#[async_trait]
impl RosterRepository for FileRosterRepository {
    async fn load(&self, identity: &Identity) -> Result<Option<RosterSnapshot>> {
        let path = self.roster_path(identity);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e)),
        };
        let snapshot: RosterSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))?;

        tracing::debug!("Loaded roster for {} from {}", identity, path.display());

        Ok(Some(snapshot))
    }

    async fn save(&self, identity: &Identity, snapshot: &RosterSnapshot) -> Result<()> {
        let path = self.roster_path(identity);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;

        fs::write(&temp_path, bytes)
            .await
            .map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path)
            .await
            .map_err(RepositoryError::Io)?;

        tracing::debug!("Saved roster for {} to {}", identity, path.display());

        Ok(())
    }
}
