//! Asynchronous abstraction for roster-filling assistants.
//!
//! Runtime users plug in [`PlayerGenerator`] implementations so new players
//! can come from an AI service, a fixture file, or a scripted list.
use async_trait::async_trait;
use roster_core::PlayerDraft;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("player generator unavailable: {0}")]
    Unavailable(String),

    #[error("player generator returned malformed output: {0}")]
    Malformed(String),
}

/// Trait for producing candidate players.
///
/// Implementations only return drafts; ids are assigned by the roster when
/// the drafts are imported.
#[async_trait]
pub trait PlayerGenerator: Send + Sync {
    /// Produce up to `count` drafts.
    ///
    /// `existing_skills` lists the skills already present in the squad so the
    /// generator can favour variety.
    async fn generate(
        &self,
        count: usize,
        existing_skills: &[String],
    ) -> std::result::Result<Vec<PlayerDraft>, GeneratorError>;
}

/// A generator that cycles through a fixed list of drafts.
/// Useful for testing or offline use.
pub struct FixedGenerator {
    drafts: Vec<PlayerDraft>,
}

impl FixedGenerator {
    pub fn new(drafts: Vec<PlayerDraft>) -> Self {
        Self { drafts }
    }
}

#[async_trait]
impl PlayerGenerator for FixedGenerator {
    async fn generate(
        &self,
        count: usize,
        _existing_skills: &[String],
    ) -> std::result::Result<Vec<PlayerDraft>, GeneratorError> {
        if self.drafts.is_empty() {
            return Err(GeneratorError::Unavailable("no drafts configured".into()));
        }
        Ok(self.drafts.iter().cycle().take(count).cloned().collect())
    }
}
