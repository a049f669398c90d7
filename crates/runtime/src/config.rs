//! Runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

use roster_core::{RoleQuotaPolicy, RosterConfig};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Engine rules (schema limits, role quota policy).
    pub roster: RosterConfig,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Quiet period after the last change before a save starts.
    pub save_debounce: Duration,
    /// Maximum save attempts per revision, first try included.
    pub save_max_retries: u32,
    /// Delay before the second attempt; doubles on every further attempt.
    pub retry_base_delay: Duration,
}

impl RuntimeConfig {
    pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 32;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
    pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;
    pub const DEFAULT_SAVE_MAX_RETRIES: u32 = 5;
    pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ROSTER_COMMAND_BUFFER` - Session command queue size (default: 32)
    /// - `ROSTER_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `ROSTER_SAVE_DEBOUNCE_MS` - Save debounce window (default: 500)
    /// - `ROSTER_SAVE_MAX_RETRIES` - Save attempts per revision (default: 5)
    /// - `ROSTER_RETRY_BASE_DELAY_MS` - First retry delay (default: 100)
    /// - `ROSTER_ROLE_POLICY` - `summed` or `independent` (default: summed)
    /// - `ROSTER_MIN_NAME_LEN` - Minimum player/team name length (default: 2)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("ROSTER_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("ROSTER_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(ms) = read_env::<u64>("ROSTER_SAVE_DEBOUNCE_MS") {
            config.save_debounce = Duration::from_millis(ms);
        }
        if let Some(retries) = read_env::<u32>("ROSTER_SAVE_MAX_RETRIES") {
            config.save_max_retries = retries.max(1);
        }
        if let Some(ms) = read_env::<u64>("ROSTER_RETRY_BASE_DELAY_MS") {
            config.retry_base_delay = Duration::from_millis(ms);
        }
        if let Some(policy) = read_env::<RoleQuotaPolicy>("ROSTER_ROLE_POLICY") {
            config.roster.role_policy = policy;
        }
        if let Some(len) = read_env::<usize>("ROSTER_MIN_NAME_LEN") {
            config.roster.schema.min_name_len = len;
        }

        config
    }

    pub fn with_save_debounce(mut self, debounce: Duration) -> Self {
        self.save_debounce = debounce;
        self
    }

    pub fn with_roster(mut self, roster: RosterConfig) -> Self {
        self.roster = roster;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            roster: RosterConfig::default(),
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER_SIZE,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            save_debounce: Duration::from_millis(Self::DEFAULT_SAVE_DEBOUNCE_MS),
            save_max_retries: Self::DEFAULT_SAVE_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(Self::DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
