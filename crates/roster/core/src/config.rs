/// Roster configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterConfig {
    /// Input limits enforced before commands reach the engine.
    pub schema: SchemaLimits,
    /// How duplicate role requirements inside one template are scored.
    pub role_policy: RoleQuotaPolicy,
}

impl RosterConfig {
    pub fn new() -> Self {
        Self {
            schema: SchemaLimits::default(),
            role_policy: RoleQuotaPolicy::default(),
        }
    }

    pub fn with_role_policy(mut self, role_policy: RoleQuotaPolicy) -> Self {
        self.role_policy = role_policy;
        self
    }

    pub fn with_schema(mut self, schema: SchemaLimits) -> Self {
        self.schema = schema;
        self
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape rules for user input (player drafts and team templates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaLimits {
    /// Minimum length of player and team names, measured after trimming.
    pub min_name_len: usize,
    /// Minimum team size.
    pub min_team_size: usize,
    /// Minimum count of a role requirement.
    pub min_role_count: u32,
}

impl SchemaLimits {
    pub const DEFAULT_MIN_NAME_LEN: usize = 2;
    pub const DEFAULT_MIN_TEAM_SIZE: usize = 1;
    pub const DEFAULT_MIN_ROLE_COUNT: u32 = 1;
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            min_name_len: Self::DEFAULT_MIN_NAME_LEN,
            min_team_size: Self::DEFAULT_MIN_TEAM_SIZE,
            min_role_count: Self::DEFAULT_MIN_ROLE_COUNT,
        }
    }
}

/// Scoring policy for templates that list the same role more than once.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoleQuotaPolicy {
    /// Entries sharing a role name merge into one quota whose count is the sum.
    #[default]
    Summed,
    /// Each entry is checked on its own against the total matching count.
    Independent,
}
