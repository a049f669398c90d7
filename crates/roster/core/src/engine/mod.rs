//! Command execution pipeline.
//!
//! The [`RosterEngine`] is the authoritative reducer for [`RosterState`]. It
//! routes every [`RosterCommand`] through the transition phases and surfaces
//! rich error information for the runtime.

mod errors;
mod transition;

pub use errors::{ExecuteError, PhaseError, TransitionPhase};

use crate::command::{CommandResult, RosterCommand};
use crate::state::{ChangeSet, RosterState};

/// Complete outcome of command execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandOutcome {
    /// Which collections changed. Empty for no-ops.
    pub changes: ChangeSet,

    /// Command-specific payload (new player ids, ...).
    pub result: CommandResult,
}

impl CommandOutcome {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Roster engine that executes commands against a borrowed state.
///
/// All state mutations flow through the three-phase pipeline:
/// pre_validate → apply → post_validate
///
/// Conflicts are caught in pre_validate, so a rejected command leaves the
/// state exactly as it was.
pub struct RosterEngine<'a> {
    state: &'a mut RosterState,
}

impl<'a> RosterEngine<'a> {
    /// Creates a new engine over the given state.
    pub fn new(state: &'a mut RosterState) -> Self {
        Self { state }
    }

    /// Executes a command by routing it through its transition pipeline.
    pub fn execute(&mut self, command: &RosterCommand) -> Result<CommandOutcome, ExecuteError> {
        let (changes, result) = transition::execute_transition(command, self.state)?;
        Ok(CommandOutcome { changes, result })
    }

    pub fn state(&self) -> &RosterState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorSeverity, RosterError};
    use crate::state::{Gender, PlayerDraft, PlayerId, SelectedPlayer, TeamDefinition, TeamId};

    fn add(engine: &mut RosterEngine<'_>, name: &str) -> PlayerId {
        let draft = PlayerDraft::new(name, Gender::Male, "Wing");
        match engine.execute(&RosterCommand::add_player(draft)).unwrap().result {
            CommandResult::PlayerAdded(id) => id,
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn occupied_slot_rejection_reports_phase_and_leaves_state() {
        let mut state = RosterState::new();
        let mut engine = RosterEngine::new(&mut state);
        let team = TeamId(1);
        engine
            .execute(&RosterCommand::set_team_definitions(vec![
                TeamDefinition::new(team, "TeamA", 2),
            ]))
            .unwrap();
        let a = add(&mut engine, "Ana");
        let b = add(&mut engine, "Ben");
        engine
            .execute(&RosterCommand::move_to_team(a, team, 0))
            .unwrap();
        let before = engine.state().clone();

        let err = engine
            .execute(&RosterCommand::move_to_team(b, team, 0))
            .unwrap_err();

        assert_eq!(err.phase(), TransitionPhase::PreValidate);
        assert!(err.is_conflict());
        assert_eq!(err.error_code(), "slot_occupied");
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn deleting_seated_player_clears_slot_and_pool() {
        let mut state = RosterState::new();
        let mut engine = RosterEngine::new(&mut state);
        let team = TeamId(1);
        engine
            .execute(&RosterCommand::set_team_definitions(vec![
                TeamDefinition::new(team, "TeamA", 2),
            ]))
            .unwrap();
        let a = add(&mut engine, "Ana");
        engine
            .execute(&RosterCommand::move_to_team(a, team, 1))
            .unwrap();

        let outcome = engine.execute(&RosterCommand::delete_player(a)).unwrap();

        assert!(!outcome.is_noop());
        let state = engine.state();
        assert_eq!(state.team(team).unwrap().slots[1], None);
        assert!(state.unassigned_players().iter().all(|p| p.id != a));
        assert!(state.player(a).is_none());
    }

    #[test]
    fn repeated_move_reports_noop() {
        let mut state = RosterState::new();
        let mut engine = RosterEngine::new(&mut state);
        let team = TeamId(1);
        engine
            .execute(&RosterCommand::set_team_definitions(vec![
                TeamDefinition::new(team, "TeamA", 2),
            ]))
            .unwrap();
        let a = add(&mut engine, "Ana");

        let first = engine
            .execute(&RosterCommand::move_to_team(a, team, 0))
            .unwrap();
        let second = engine
            .execute(&RosterCommand::move_to_team(a, team, 0))
            .unwrap();

        assert_eq!(first.changes, ChangeSet::TEAMS);
        assert!(second.is_noop());
    }

    #[test]
    fn stale_swap_is_a_conflict() {
        let mut state = RosterState::new();
        let mut engine = RosterEngine::new(&mut state);
        let team = TeamId(1);
        engine
            .execute(&RosterCommand::set_team_definitions(vec![
                TeamDefinition::new(team, "TeamA", 2),
            ]))
            .unwrap();
        let a = add(&mut engine, "Ana");
        let b = add(&mut engine, "Ben");
        engine
            .execute(&RosterCommand::move_to_team(a, team, 0))
            .unwrap();

        let err = engine
            .execute(&RosterCommand::swap(
                SelectedPlayer::new(a, team, 0),
                SelectedPlayer::new(b, team, 1),
            ))
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().starts_with("assignment command failed: pre_validate failed"));
    }

    #[test]
    fn import_returns_ids_in_order() {
        let mut state = RosterState::new();
        let mut engine = RosterEngine::new(&mut state);
        let drafts = vec![
            PlayerDraft::new("Ana", Gender::Female, "Goalie"),
            PlayerDraft::new("Ben", Gender::Male, "Wing"),
        ];
        let outcome = engine
            .execute(&RosterCommand::import_players(drafts))
            .unwrap();
        assert_eq!(
            outcome.result,
            CommandResult::PlayersImported(vec![PlayerId(1), PlayerId(2)])
        );
    }
}
