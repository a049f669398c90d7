//! Command dispatch and execution logic.

use crate::command::{Applied, CommandResult, CommandTransition, RosterCommand};
use crate::state::{ChangeSet, RosterState};

use super::errors::{ExecuteError, PhaseError, TransitionPhase};

/// Executes a transition through the three-phase pipeline.
///
/// Phases:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the roster state
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut RosterState,
) -> Result<Applied<T::Output>, PhaseError<T::Error>>
where
    T: CommandTransition,
{
    transition
        .pre_validate(state)
        .map_err(|error| PhaseError::new(TransitionPhase::PreValidate, error))?;

    let applied = transition
        .apply(state)
        .map_err(|error| PhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state)
        .map_err(|error| PhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(applied)
}

/// Routes each command to its transition and wraps the output in [`CommandResult`].
pub(super) fn execute_transition(
    command: &RosterCommand,
    state: &mut RosterState,
) -> Result<(ChangeSet, CommandResult), ExecuteError> {
    match command {
        RosterCommand::AddPlayer(transition) => {
            let applied = drive_transition(transition, state).map_err(ExecuteError::Player)?;
            Ok((applied.changes, CommandResult::PlayerAdded(applied.output)))
        }
        RosterCommand::ImportPlayers(transition) => {
            let applied = drive_transition(transition, state).map_err(ExecuteError::Player)?;
            Ok((applied.changes, CommandResult::PlayersImported(applied.output)))
        }
        RosterCommand::UpdatePlayer(transition) => {
            let applied = drive_transition(transition, state).map_err(ExecuteError::Player)?;
            Ok((applied.changes, CommandResult::None))
        }
        RosterCommand::DeletePlayer(transition) => {
            let applied = drive_transition(transition, state).map_err(ExecuteError::Player)?;
            Ok((applied.changes, CommandResult::None))
        }
        RosterCommand::SetTeamDefinitions(transition) => {
            let applied =
                drive_transition(transition, state).map_err(ExecuteError::Definition)?;
            Ok((applied.changes, CommandResult::None))
        }
        RosterCommand::MoveToTeam(transition) => {
            let applied =
                drive_transition(transition, state).map_err(ExecuteError::Assignment)?;
            Ok((applied.changes, CommandResult::None))
        }
        RosterCommand::MoveToSquad(transition) => {
            let applied =
                drive_transition(transition, state).map_err(ExecuteError::Assignment)?;
            Ok((applied.changes, CommandResult::None))
        }
        RosterCommand::Swap(transition) => {
            let applied =
                drive_transition(transition, state).map_err(ExecuteError::Assignment)?;
            Ok((applied.changes, CommandResult::None))
        }
    }
}
