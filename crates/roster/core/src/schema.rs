//! Input shape checks applied before a command reaches the engine.
//!
//! These mirror the form rules of the UI: names long enough, sizes and role
//! counts positive, team names unique. The engine itself does not depend on
//! them, so callers decide when to enforce them.

use std::collections::HashSet;
use std::fmt;

use crate::config::SchemaLimits;
use crate::state::{PlayerDraft, TeamDefinition};

/// A single rejected input field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaViolation {
    /// Dotted path to the offending field, e.g. `teams[1].size`.
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Checks a player draft (from a form or a generator).
pub fn validate_player_draft(draft: &PlayerDraft, limits: &SchemaLimits) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    if char_len(&draft.name) < limits.min_name_len {
        violations.push(SchemaViolation::new(
            "name",
            format!("Name must be at least {} characters.", limits.min_name_len),
        ));
    }
    if draft.skill.trim().is_empty() {
        violations.push(SchemaViolation::new("skill", "Skill/Role is required."));
    }
    violations
}

/// Checks a full replacement list of team definitions.
pub fn validate_definitions(
    definitions: &[TeamDefinition],
    limits: &SchemaLimits,
) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    for (index, def) in definitions.iter().enumerate() {
        if char_len(&def.name) < limits.min_name_len {
            violations.push(SchemaViolation::new(
                format!("teams[{index}].name"),
                format!(
                    "Team name must be at least {} characters.",
                    limits.min_name_len
                ),
            ));
        }
        if def.size < limits.min_team_size {
            violations.push(SchemaViolation::new(
                format!("teams[{index}].size"),
                format!("Team size must be at least {}.", limits.min_team_size),
            ));
        }
        for (req_index, req) in def.role_requirements.iter().enumerate() {
            let path = format!("teams[{index}].role_requirements[{req_index}]");
            if req.role.trim().is_empty() {
                violations.push(SchemaViolation::new(
                    format!("{path}.role"),
                    "Role name is required.",
                ));
            }
            if req.count < limits.min_role_count {
                violations.push(SchemaViolation::new(
                    format!("{path}.count"),
                    format!("Count must be at least {}.", limits.min_role_count),
                ));
            }
        }
    }

    let mut names = HashSet::new();
    let unique = definitions
        .iter()
        .all(|def| names.insert(def.name.trim().to_lowercase()));
    if !unique {
        violations.push(SchemaViolation::new("teams", "Team names must be unique."));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Gender, TeamId};

    #[test]
    fn short_name_and_blank_skill_are_rejected() {
        let draft = PlayerDraft::new(" A ", Gender::Male, "  ");
        let violations = validate_player_draft(&draft, &SchemaLimits::default());
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "skill"]);
        assert_eq!(
            violations[0].to_string(),
            "name: Name must be at least 2 characters."
        );
    }

    #[test]
    fn valid_draft_passes() {
        let draft = PlayerDraft::new("Ana", Gender::Female, "Goalie");
        assert!(validate_player_draft(&draft, &SchemaLimits::default()).is_empty());
    }

    #[test]
    fn definition_rules_report_field_paths() {
        let bad = TeamDefinition::new(TeamId(1), "R", 0).with_role("", 0);
        let violations = validate_definitions(&[bad], &SchemaLimits::default());
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "teams[0].name",
                "teams[0].size",
                "teams[0].role_requirements[0].role",
                "teams[0].role_requirements[0].count",
            ]
        );
    }

    #[test]
    fn team_names_must_be_unique_ignoring_case_and_padding() {
        let defs = [
            TeamDefinition::new(TeamId(1), "Reds", 2),
            TeamDefinition::new(TeamId(2), " reds ", 2),
        ];
        let violations = validate_definitions(&defs, &SchemaLimits::default());
        assert_eq!(
            violations,
            vec![SchemaViolation::new("teams", "Team names must be unique.")]
        );
    }

    #[test]
    fn custom_limits_apply() {
        let limits = SchemaLimits {
            min_name_len: 4,
            ..SchemaLimits::default()
        };
        let draft = PlayerDraft::new("Ana", Gender::Female, "Goalie");
        assert_eq!(validate_player_draft(&draft, &limits).len(), 1);
    }
}
