//! Pool mutations: add, import, update and delete players.

use crate::command::{Applied, CommandTransition};
use crate::error::{ErrorSeverity, RosterError};
use crate::state::{ChangeSet, Player, PlayerDraft, PlayerId, RosterState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerError {
    #[error("{0} not found")]
    PlayerNotFound(PlayerId),

    #[error("no player ids left for {requested} new player(s)")]
    IdsExhausted { requested: usize },

    #[error("{player} still occupies {copies} slot(s) after removal")]
    DanglingSlot { player: PlayerId, copies: usize },

    #[error("{player} has an outdated copy in a team slot")]
    StaleCopy { player: PlayerId },
}

impl RosterError for PlayerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PlayerNotFound(_) | Self::IdsExhausted { .. } => ErrorSeverity::Validation,
            Self::DanglingSlot { .. } | Self::StaleCopy { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PlayerNotFound(_) => "player_not_found",
            Self::IdsExhausted { .. } => "ids_exhausted",
            Self::DanglingSlot { .. } => "dangling_slot",
            Self::StaleCopy { .. } => "stale_copy",
        }
    }
}

fn ensure_ids(state: &RosterState, requested: usize) -> Result<(), PlayerError> {
    if (state.player_ids_remaining() as usize) < requested {
        return Err(PlayerError::IdsExhausted { requested });
    }
    Ok(())
}

/// Adds a new player to the pool with a freshly allocated id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddPlayer {
    pub draft: PlayerDraft,
}

impl CommandTransition for AddPlayer {
    type Error = PlayerError;
    type Output = PlayerId;

    fn pre_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        ensure_ids(state, 1)
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<PlayerId>, PlayerError> {
        let id = state
            .allocate_player_id()
            .ok_or(PlayerError::IdsExhausted { requested: 1 })?;
        state
            .players_mut()
            .push(Player::from_draft(id, self.draft.clone()));
        Ok(Applied::new(ChangeSet::PLAYERS, id))
    }
}

/// Adds a batch of players in one step, e.g. the output of a generator.
///
/// Either every draft is added or none is.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportPlayers {
    pub drafts: Vec<PlayerDraft>,
}

impl CommandTransition for ImportPlayers {
    type Error = PlayerError;
    type Output = Vec<PlayerId>;

    fn pre_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        ensure_ids(state, self.drafts.len())
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<Vec<PlayerId>>, PlayerError> {
        if self.drafts.is_empty() {
            return Ok(Applied::new(ChangeSet::empty(), Vec::new()));
        }

        let mut ids = Vec::with_capacity(self.drafts.len());
        for draft in &self.drafts {
            let id = state
                .allocate_player_id()
                .ok_or(PlayerError::IdsExhausted {
                    requested: self.drafts.len(),
                })?;
            state
                .players_mut()
                .push(Player::from_draft(id, draft.clone()));
            ids.push(id);
        }
        Ok(Applied::new(ChangeSet::PLAYERS, ids))
    }
}

/// Replaces a pool entry and every team slot copy of it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdatePlayer {
    pub player: Player,
}

impl CommandTransition for UpdatePlayer {
    type Error = PlayerError;
    type Output = ();

    fn pre_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        state
            .player(self.player.id)
            .map(|_| ())
            .ok_or(PlayerError::PlayerNotFound(self.player.id))
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, PlayerError> {
        let id = self.player.id;
        let entry = state
            .players_mut()
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PlayerError::PlayerNotFound(id))?;
        if *entry == self.player {
            return Ok(Applied::unchanged());
        }
        *entry = self.player.clone();

        let mut changes = ChangeSet::PLAYERS;
        for slot in state.teams_mut().iter_mut().flat_map(|t| t.slots.iter_mut()) {
            if slot.as_ref().is_some_and(|p| p.id == id) {
                *slot = Some(self.player.clone());
                changes |= ChangeSet::TEAMS;
            }
        }
        Ok(Applied::changed(changes))
    }

    fn post_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        let stale = state
            .teams()
            .iter()
            .flat_map(|t| t.players())
            .any(|p| p.id == self.player.id && *p != self.player);
        if stale {
            return Err(PlayerError::StaleCopy {
                player: self.player.id,
            });
        }
        Ok(())
    }
}

/// Removes a player from the pool and clears every slot holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeletePlayer {
    pub player: PlayerId,
}

impl CommandTransition for DeletePlayer {
    type Error = PlayerError;
    type Output = ();

    fn pre_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        state
            .player(self.player)
            .map(|_| ())
            .ok_or(PlayerError::PlayerNotFound(self.player))
    }

    fn apply(&self, state: &mut RosterState) -> Result<Applied<()>, PlayerError> {
        let players = state.players_mut();
        let before = players.len();
        players.retain(|p| p.id != self.player);
        if players.len() == before {
            return Err(PlayerError::PlayerNotFound(self.player));
        }

        let mut changes = ChangeSet::PLAYERS;
        for slot in state.teams_mut().iter_mut().flat_map(|t| t.slots.iter_mut()) {
            if slot.as_ref().is_some_and(|p| p.id == self.player) {
                *slot = None;
                changes |= ChangeSet::TEAMS;
            }
        }
        Ok(Applied::changed(changes))
    }

    fn post_validate(&self, state: &RosterState) -> Result<(), PlayerError> {
        let copies = state
            .teams()
            .iter()
            .filter(|t| t.position_of(self.player).is_some())
            .count();
        if copies > 0 {
            return Err(PlayerError::DanglingSlot {
                player: self.player,
                copies,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MoveToTeam;
    use crate::state::{Gender, RosterSnapshot, TeamDefinition, TeamId};

    fn drive<T: CommandTransition>(
        command: &T,
        state: &mut RosterState,
    ) -> Result<Applied<T::Output>, T::Error> {
        command.pre_validate(state)?;
        let applied = command.apply(state)?;
        command.post_validate(state)?;
        Ok(applied)
    }

    fn add(state: &mut RosterState, name: &str, gender: Gender, skill: &str) -> PlayerId {
        let draft = PlayerDraft::new(name, gender, skill);
        drive(&AddPlayer { draft }, state).unwrap().output
    }

    fn seated_state() -> (RosterState, PlayerId, TeamId) {
        let mut state = RosterState::new();
        let team = state.allocate_team_id().unwrap();
        let defs = vec![TeamDefinition::new(team, "Reds", 2)];
        drive(&crate::command::SetTeamDefinitions { definitions: defs }, &mut state).unwrap();
        let id = add(&mut state, "Ana", Gender::Female, "Goalie");
        drive(
            &MoveToTeam {
                player: id,
                team,
                slot: 1,
            },
            &mut state,
        )
        .unwrap();
        (state, id, team)
    }

    #[test]
    fn add_allocates_unique_ids_that_are_never_reused() {
        let mut state = RosterState::new();
        let a = add(&mut state, "Ana", Gender::Female, "Goalie");
        let b = add(&mut state, "Ben", Gender::Male, "Wing");
        assert_ne!(a, b);

        drive(&DeletePlayer { player: b }, &mut state).unwrap();
        let c = add(&mut state, "Cy", Gender::Other, "Wing");
        assert!(c > b);
        assert_eq!(state.players().len(), 2);
        assert_eq!(state.unassigned_players().len(), 2);
    }

    #[test]
    fn adding_past_the_last_id_is_rejected_untouched() {
        let mut state = RosterState::from_snapshot(RosterSnapshot {
            players: vec![Player::new(PlayerId(u32::MAX - 2), "Ana", Gender::Female, "Goalie")],
            ..RosterSnapshot::default()
        });
        let last = add(&mut state, "Ben", Gender::Male, "Wing");
        assert_eq!(last, PlayerId(u32::MAX - 1));

        let err = drive(
            &AddPlayer {
                draft: PlayerDraft::new("Cy", Gender::Other, "Wing"),
            },
            &mut state,
        )
        .unwrap_err();
        assert_eq!(err, PlayerError::IdsExhausted { requested: 1 });
        assert_eq!(err.error_code(), "ids_exhausted");

        let drafts = vec![PlayerDraft::new("Di", Gender::Female, "Wing")];
        let err = drive(&ImportPlayers { drafts }, &mut state).unwrap_err();
        assert_eq!(err, PlayerError::IdsExhausted { requested: 1 });
        assert_eq!(state.players().len(), 2);
    }

    #[test]
    fn import_adds_all_drafts() {
        let mut state = RosterState::new();
        let drafts = vec![
            PlayerDraft::new("Ana", Gender::Female, "Goalie"),
            PlayerDraft::new("Ben", Gender::Male, "Wing"),
        ];
        let applied = drive(&ImportPlayers { drafts }, &mut state).unwrap();
        assert_eq!(applied.output.len(), 2);
        assert_eq!(applied.changes, ChangeSet::PLAYERS);
        assert_eq!(state.players().len(), 2);

        let empty = drive(&ImportPlayers { drafts: vec![] }, &mut state).unwrap();
        assert!(empty.changes.is_empty());
    }

    #[test]
    fn update_propagates_into_slots() {
        let (mut state, id, team) = seated_state();
        let updated = Player::new(id, "Ana Maria", Gender::Female, "Defender");

        let applied = drive(
            &UpdatePlayer {
                player: updated.clone(),
            },
            &mut state,
        )
        .unwrap();

        assert_eq!(applied.changes, ChangeSet::PLAYERS | ChangeSet::TEAMS);
        assert_eq!(state.player(id), Some(&updated));
        assert_eq!(state.team(team).unwrap().slots[1].as_ref(), Some(&updated));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn update_with_identical_record_is_noop() {
        let (mut state, id, _) = seated_state();
        let same = state.player(id).cloned().unwrap();
        let applied = drive(&UpdatePlayer { player: same }, &mut state).unwrap();
        assert!(applied.changes.is_empty());
    }

    #[test]
    fn update_unknown_player_is_rejected() {
        let mut state = RosterState::new();
        let ghost = Player::new(PlayerId(9), "Ghost", Gender::Male, "Wing");
        let err = drive(&UpdatePlayer { player: ghost }, &mut state).unwrap_err();
        assert_eq!(err, PlayerError::PlayerNotFound(PlayerId(9)));
        assert!(state.players().is_empty());
    }

    #[test]
    fn delete_clears_assigned_slot() {
        let (mut state, id, team) = seated_state();

        drive(&DeletePlayer { player: id }, &mut state).unwrap();

        assert_eq!(state.team(team).unwrap().slots[1], None);
        assert!(state.player(id).is_none());
        assert!(state.unassigned_players().iter().all(|p| p.id != id));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn delete_unknown_player_is_rejected() {
        let (mut state, _, _) = seated_state();
        let before = state.clone();
        let err = drive(&DeletePlayer { player: PlayerId(77) }, &mut state).unwrap_err();
        assert_eq!(err.error_code(), "player_not_found");
        assert_eq!(state, before);
    }
}
