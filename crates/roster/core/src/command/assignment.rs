//! Slot assignment: move into a team, return to the squad, swap.

use crate::command::{Applied, CommandTransition};
use crate::error::{ErrorSeverity, RosterError};
use crate::state::{ChangeSet, Placement, PlayerId, RosterState, SelectedPlayer, TeamId};

/// Rejections raised by assignment commands.
///
/// Every variant is detected before the state is touched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignmentError {
    #[error("{0} not found")]
    PlayerNotFound(PlayerId),

    #[error("{0} not found")]
    TeamNotFound(TeamId),

    #[error("slot {slot} out of range for {team} (size {size})")]
    SlotOutOfRange {
        team: TeamId,
        slot: usize,
        size: usize,
    },

    #[error("{team} slot {slot} is occupied by {occupant}")]
    SlotOccupied {
        team: TeamId,
        slot: usize,
        occupant: PlayerId,
    },

    #[error("{team} slot {slot} no longer holds {expected}")]
    StalePlayerReference {
        expected: PlayerId,
        team: TeamId,
        slot: usize,
    },

    #[error("{player} ended up in {count} slots")]
    DuplicateAssignment { player: PlayerId, count: usize },
}

impl AssignmentError {
    /// Conflicts are expected races with the caller's view of the board.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SlotOccupied { .. } | Self::StalePlayerReference { .. }
        )
    }
}

impl RosterError for AssignmentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SlotOccupied { .. } | Self::StalePlayerReference { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::PlayerNotFound(_) | Self::TeamNotFound(_) | Self::SlotOutOfRange { .. } => {
                ErrorSeverity::Validation
            }
            Self::DuplicateAssignment { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PlayerNotFound(_) => "player_not_found",
            Self::TeamNotFound(_) => "team_not_found",
            Self::SlotOutOfRange { .. } => "slot_out_of_range",
            Self::SlotOccupied { .. } => "slot_occupied",
            Self::StalePlayerReference { .. } => "stale_player_reference",
            Self::DuplicateAssignment { .. } => "duplicate_assignment",
        }
    }
}

fn occurrences(state: &RosterState, player: PlayerId) -> usize {
    state
        .teams()
        .iter()
        .flat_map(|t| t.players())
        .filter(|p| p.id == player)
        .count()
}

fn ensure_single(state: &RosterState, player: PlayerId) -> Result<(), AssignmentError> {
    match occurrences(state, player) {
        0 | 1 => Ok(()),
        count => Err(AssignmentError::DuplicateAssignment { player, count }),
    }
}

/// Seats `player` at `slot` of `team`, vacating its previous slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveToTeam {
    pub player: PlayerId,
    pub team: TeamId,
    pub slot: usize,
}

impl MoveToTeam {
    fn is_in_place(&self, state: &RosterState) -> bool {
        state.placement(self.player)
            == Some(Placement::Assigned {
                team: self.team,
                slot: self.slot,
            })
    }
}

impl CommandTransition for MoveToTeam {
    type Error = AssignmentError;
    type Output = ();

    fn pre_validate(&self, state: &RosterState) -> Result<(), AssignmentError> {
        if state.player(self.player).is_none() {
            return Err(AssignmentError::PlayerNotFound(self.player));
        }
        let team = state
            .team(self.team)
            .ok_or(AssignmentError::TeamNotFound(self.team))?;
        if self.slot >= team.slots.len() {
            return Err(AssignmentError::SlotOutOfRange {
                team: self.team,
                slot: self.slot,
                size: team.slots.len(),
            });
        }
        match team.occupant(self.slot) {
            Some(occupant) if occupant != self.player => Err(AssignmentError::SlotOccupied {
                team: self.team,
                slot: self.slot,
                occupant,
            }),
            _ => Ok(()),
        }
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, AssignmentError> {
        if self.is_in_place(state) {
            return Ok(Applied::unchanged());
        }
        let player = state
            .player(self.player)
            .cloned()
            .ok_or(AssignmentError::PlayerNotFound(self.player))?;

        if let Some(Placement::Assigned { team, slot }) = state.placement(self.player)
            && let Some(previous) = state.team_mut(team)
        {
            previous.slots[slot] = None;
        }

        let team = state
            .team_mut(self.team)
            .ok_or(AssignmentError::TeamNotFound(self.team))?;
        let size = team.slots.len();
        let target = team
            .slots
            .get_mut(self.slot)
            .ok_or(AssignmentError::SlotOutOfRange {
                team: self.team,
                slot: self.slot,
                size,
            })?;
        *target = Some(player);
        Ok(Applied::changed(ChangeSet::TEAMS))
    }

    fn post_validate(&self, state: &RosterState) -> Result<(), AssignmentError> {
        ensure_single(state, self.player)
    }
}

/// Returns `player` to the squad by clearing `slot` of `team`.
///
/// Only clears the slot if it still holds `player`; anything else is a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveToSquad {
    pub player: PlayerId,
    pub team: TeamId,
    pub slot: usize,
}

impl CommandTransition for MoveToSquad {
    type Error = AssignmentError;
    type Output = ();

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, AssignmentError> {
        let Some(slot) = state
            .team_mut(self.team)
            .and_then(|team| team.slots.get_mut(self.slot))
        else {
            return Ok(Applied::unchanged());
        };
        if slot.as_ref().is_some_and(|p| p.id == self.player) {
            *slot = None;
            return Ok(Applied::changed(ChangeSet::TEAMS));
        }
        Ok(Applied::unchanged())
    }
}

/// Exchanges the occupants of two slots, possibly in the same team.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swap {
    pub first: SelectedPlayer,
    pub second: SelectedPlayer,
}

impl Swap {
    fn is_self_swap(&self) -> bool {
        self.first.team == self.second.team && self.first.slot == self.second.slot
    }
}

fn ensure_holds(state: &RosterState, selected: &SelectedPlayer) -> Result<(), AssignmentError> {
    let holds = state
        .team(selected.team)
        .and_then(|team| team.occupant(selected.slot))
        == Some(selected.player);
    if holds {
        Ok(())
    } else {
        Err(AssignmentError::StalePlayerReference {
            expected: selected.player,
            team: selected.team,
            slot: selected.slot,
        })
    }
}

impl CommandTransition for Swap {
    type Error = AssignmentError;
    type Output = ();

    fn pre_validate(&self, state: &RosterState) -> Result<(), AssignmentError> {
        ensure_holds(state, &self.first)?;
        ensure_holds(state, &self.second)
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, AssignmentError> {
        if self.is_self_swap() {
            return Ok(Applied::unchanged());
        }
        let (a, b) = state
            .slot_pair_mut(
                (self.first.team, self.first.slot),
                (self.second.team, self.second.slot),
            )
            .ok_or(AssignmentError::StalePlayerReference {
                expected: self.first.player,
                team: self.first.team,
                slot: self.first.slot,
            })?;
        std::mem::swap(a, b);
        Ok(Applied::changed(ChangeSet::TEAMS))
    }

    fn post_validate(&self, state: &RosterState) -> Result<(), AssignmentError> {
        ensure_single(state, self.first.player)?;
        ensure_single(state, self.second.player)
    }
}
