//! Team compliance scoring.
//!
//! [`validate`] checks a team against its definition and produces a
//! [`ComplianceReport`]. Reports are derived on demand and never stored.

use std::fmt;

use crate::config::RoleQuotaPolicy;
use crate::state::{RosterState, Team, TeamDefinition, TeamId, normalize_role};

/// Three-state classification that drives status indicators.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TeamStatus {
    /// Rule violations, or no players at all.
    Invalid,
    /// Passes every rule but has empty slots.
    Incomplete,
    /// Passes every rule at full capacity.
    Complete,
}

/// A role quota the team falls short of.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleShortfall {
    pub role: String,
    pub required: u32,
    pub actual: u32,
}

impl RoleShortfall {
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.actual)
    }
}

/// One violated rule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComplianceIssue {
    OverCapacity { count: usize, size: usize },
    MissingFemale,
    Role(RoleShortfall),
}

impl fmt::Display for ComplianceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverCapacity { count, size } => {
                write!(f, "has {count} players but capacity is {size}")
            }
            Self::MissingFemale => f.write_str("needs at least one female player"),
            Self::Role(shortfall) => write!(
                f,
                "needs {} more {} (has {} of {})",
                shortfall.missing(),
                shortfall.role,
                shortfall.actual,
                shortfall.required
            ),
        }
    }
}

/// Structured compliance result for one team.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplianceReport {
    pub team: TeamId,
    pub player_count: usize,
    pub size: usize,
    pub over_capacity: bool,
    pub missing_female: bool,
    pub shortfalls: Vec<RoleShortfall>,
    pub errors: Vec<ComplianceIssue>,
}

impl ComplianceReport {
    /// No violated rule and at least one player.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.player_count > 0
    }

    pub fn is_complete(&self) -> bool {
        self.is_valid() && self.player_count == self.size
    }

    pub fn status(&self) -> TeamStatus {
        if self.is_complete() {
            TeamStatus::Complete
        } else if self.is_valid() {
            TeamStatus::Incomplete
        } else {
            TeamStatus::Invalid
        }
    }

    /// Human-readable error lines.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Scores `team` against `definition` with the default role policy.
pub fn validate(team: &Team, definition: &TeamDefinition) -> ComplianceReport {
    validate_with(team, definition, RoleQuotaPolicy::default())
}

/// Scores `team` against `definition`.
pub fn validate_with(
    team: &Team,
    definition: &TeamDefinition,
    policy: RoleQuotaPolicy,
) -> ComplianceReport {
    let player_count = team.player_count();
    let over_capacity = player_count > definition.size;
    let missing_female = definition.require_female && !team.players().any(|p| p.is_female());

    let shortfalls: Vec<RoleShortfall> = quotas(definition, policy)
        .into_iter()
        .filter_map(|(role, required)| {
            let actual = team.players().filter(|p| p.plays(&role)).count() as u32;
            (actual < required).then_some(RoleShortfall {
                role,
                required,
                actual,
            })
        })
        .collect();

    let mut errors = Vec::new();
    if over_capacity {
        errors.push(ComplianceIssue::OverCapacity {
            count: player_count,
            size: definition.size,
        });
    }
    if missing_female {
        errors.push(ComplianceIssue::MissingFemale);
    }
    errors.extend(shortfalls.iter().cloned().map(ComplianceIssue::Role));

    ComplianceReport {
        team: definition.id,
        player_count,
        size: definition.size,
        over_capacity,
        missing_female,
        shortfalls,
        errors,
    }
}

/// One report per team, in definition order.
pub fn validate_all(state: &RosterState, policy: RoleQuotaPolicy) -> Vec<ComplianceReport> {
    state
        .team_pairs()
        .map(|(team, def)| validate_with(team, def, policy))
        .collect()
}

/// Role quotas to check, labelled with the first spelling seen.
fn quotas(definition: &TeamDefinition, policy: RoleQuotaPolicy) -> Vec<(String, u32)> {
    let requirements = definition.role_requirements.iter();
    match policy {
        RoleQuotaPolicy::Independent => requirements.map(|r| (r.role.clone(), r.count)).collect(),
        RoleQuotaPolicy::Summed => {
            let mut merged: Vec<(String, String, u32)> = Vec::new();
            for req in requirements {
                let key = normalize_role(&req.role);
                match merged.iter_mut().find(|(k, _, _)| *k == key) {
                    Some((_, _, count)) => *count += req.count,
                    None => merged.push((key, req.role.clone(), req.count)),
                }
            }
            merged
                .into_iter()
                .map(|(_, role, count)| (role, count))
                .collect()
        }
    }
}
