//! Wholesale replacement of the team definition list.

use std::collections::HashSet;

use crate::command::{Applied, CommandTransition};
use crate::error::{ErrorSeverity, RosterError};
use crate::reconcile::reconcile;
use crate::state::{ChangeSet, InvariantViolation, RosterState, TeamDefinition, TeamId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("definition id {0} appears more than once")]
    DuplicateDefinitionId(TeamId),

    #[error("definition {0} has size 0")]
    ZeroSize(TeamId),

    #[error("teams out of sync with definitions: {0}")]
    Misaligned(#[from] InvariantViolation),
}

impl RosterError for DefinitionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateDefinitionId(_) | Self::ZeroSize(_) => ErrorSeverity::Validation,
            Self::Misaligned(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateDefinitionId(_) => "duplicate_definition_id",
            Self::ZeroSize(_) => "zero_size",
            Self::Misaligned(_) => "misaligned_teams",
        }
    }
}

/// Replaces the definitions and reconciles teams against them.
///
/// Players dropped by shrinking or removing a team become unassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetTeamDefinitions {
    pub definitions: Vec<TeamDefinition>,
}

impl CommandTransition for SetTeamDefinitions {
    type Error = DefinitionError;
    type Output = ();

    fn pre_validate(&self, _state: &RosterState) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !seen.insert(def.id) {
                return Err(DefinitionError::DuplicateDefinitionId(def.id));
            }
            if def.size == 0 {
                return Err(DefinitionError::ZeroSize(def.id));
            }
        }
        Ok(())
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, DefinitionError> {
        if state.definitions() == self.definitions.as_slice() {
            return Ok(Applied::unchanged());
        }

        for def in &self.definitions {
            state.reserve_team_id(def.id);
        }
        let previous = std::mem::take(state.teams_mut());
        let teams = reconcile(&self.definitions, previous);
        let teams_changed = teams.as_slice() != state.teams();

        *state.teams_mut() = teams;
        state.replace_definitions(self.definitions.clone());

        let mut changes = ChangeSet::DEFINITIONS;
        if teams_changed {
            changes |= ChangeSet::TEAMS;
        }
        Ok(Applied::changed(changes))
    }

    fn post_validate(&self, state: &RosterState) -> Result<(), DefinitionError> {
        state.check_invariants()?;
        Ok(())
    }
}
