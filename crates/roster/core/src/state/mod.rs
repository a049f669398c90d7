//! Authoritative roster state representation.
//!
//! [`RosterState`] exclusively owns the player pool, the team definitions and
//! the teams derived from them. Callers get read-only views; mutation goes
//! through [`RosterEngine`](crate::engine::RosterEngine) commands.
pub mod changes;
pub mod types;

use std::collections::HashSet;

pub use changes::ChangeSet;
pub use types::{
    Gender, Player, PlayerDraft, PlayerId, RoleRequirement, RoleRequirementId, SelectedPlayer,
    Slot, Team, TeamDefinition, TeamId, normalize_role,
};

use crate::reconcile::reconcile;

/// Where a player currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// In the pool, referenced by no team slot.
    Unassigned,
    /// Occupying `slot` of `team`.
    Assigned { team: TeamId, slot: usize },
}

/// Persisted shape of a roster: the three source-of-truth collections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterSnapshot {
    pub players: Vec<Player>,
    pub definitions: Vec<TeamDefinition>,
    pub teams: Vec<Team>,
}

/// Violation of a global roster invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{player} is assigned to more than one slot")]
    DuplicateAssignment { player: PlayerId },

    #[error("{team} slot {slot} references {player}, which is not in the pool")]
    UnknownPlayer {
        player: PlayerId,
        team: TeamId,
        slot: usize,
    },

    #[error("{team} slot {slot} holds an outdated copy of {player}")]
    StaleCopy {
        player: PlayerId,
        team: TeamId,
        slot: usize,
    },

    #[error("{team} has {actual} slots but its definition requires {expected}")]
    SlotCountMismatch {
        team: TeamId,
        expected: usize,
        actual: usize,
    },

    #[error("team at position {index} does not match definition {expected}")]
    TeamDefinitionMismatch { index: usize, expected: TeamId },

    #[error("team count {teams} does not match definition count {definitions}")]
    TeamCountMismatch { teams: usize, definitions: usize },

    #[error("definition id {0} appears more than once")]
    DuplicateDefinition(TeamId),

    #[error("definition {0} has size 0")]
    EmptyDefinition(TeamId),
}

/// Canonical snapshot of one user's roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterState {
    /// Sequential player id allocator (monotonically increasing, never reused).
    next_player_id: u32,
    /// Sequential team definition id allocator.
    next_team_id: u32,
    players: Vec<Player>,
    definitions: Vec<TeamDefinition>,
    teams: Vec<Team>,
}

impl RosterState {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self {
            next_player_id: 1,
            next_team_id: 1,
            players: Vec::new(),
            definitions: Vec::new(),
            teams: Vec::new(),
        }
    }

    /// Rebuilds a roster from persisted collections.
    ///
    /// Stored data is not trusted blindly. Definitions with a repeated id
    /// (first one wins) or size 0 are dropped, teams are reconciled against
    /// the rest, slots referencing players missing from the pool or already
    /// seated elsewhere are cleared, and slot copies are refreshed from the
    /// pool. Id allocators resume past the highest stored id.
    pub fn from_snapshot(snapshot: RosterSnapshot) -> Self {
        let RosterSnapshot {
            players,
            mut definitions,
            teams,
        } = snapshot;

        let mut ids = HashSet::new();
        definitions.retain(|def| def.size > 0 && ids.insert(def.id));

        let mut teams = reconcile(&definitions, teams);
        let mut seen = HashSet::new();
        for slot in teams.iter_mut().flat_map(|team| team.slots.iter_mut()) {
            let Some(held) = slot.as_ref().map(|p| p.id) else {
                continue;
            };
            match players.iter().find(|p| p.id == held) {
                Some(current) if seen.insert(held) => *slot = Some(current.clone()),
                _ => *slot = None,
            }
        }

        // Saturates at u32::MAX, which is never handed out.
        let next_player_id = players
            .iter()
            .map(|p| p.id.0.saturating_add(1))
            .max()
            .unwrap_or(1);
        let next_team_id = definitions
            .iter()
            .map(|d| d.id.0.saturating_add(1))
            .max()
            .unwrap_or(1);

        Self {
            next_player_id,
            next_team_id,
            players,
            definitions,
            teams,
        }
    }

    /// Clones the source-of-truth collections for persistence or export.
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            players: self.players.clone(),
            definitions: self.definitions.clone(),
            teams: self.teams.clone(),
        }
    }

    // ===== read-only views =====

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn definitions(&self) -> &[TeamDefinition] {
        &self.definitions
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.definition == id)
    }

    pub fn definition(&self, id: TeamId) -> Option<&TeamDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Teams paired with their definitions, in definition order.
    pub fn team_pairs(&self) -> impl Iterator<Item = (&Team, &TeamDefinition)> {
        self.teams
            .iter()
            .filter_map(|team| self.definition(team.definition).map(|def| (team, def)))
    }

    /// Current placement of `player`.
    ///
    /// Returns `None` if the player is not in the pool.
    pub fn placement(&self, player: PlayerId) -> Option<Placement> {
        self.player(player)?;
        let placement = self
            .teams
            .iter()
            .find_map(|team| {
                team.position_of(player).map(|slot| Placement::Assigned {
                    team: team.definition,
                    slot,
                })
            })
            .unwrap_or(Placement::Unassigned);
        Some(placement)
    }

    /// Pool players referenced by no team slot, in pool order.
    ///
    /// Derived on every call; never stored.
    pub fn unassigned_players(&self) -> Vec<&Player> {
        let assigned: HashSet<PlayerId> = self
            .teams
            .iter()
            .flat_map(Team::players)
            .map(|p| p.id)
            .collect();
        self.players
            .iter()
            .filter(|p| !assigned.contains(&p.id))
            .collect()
    }

    /// Distinct skills present in the pool, first occurrence wins.
    pub fn distinct_skills(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.players
            .iter()
            .filter(|p| seen.insert(normalize_role(&p.skill)))
            .map(|p| p.skill.clone())
            .collect()
    }

    /// Hands out a fresh id for a new team definition.
    ///
    /// Ids are never reused within a roster; returns `None` once the id
    /// space is used up.
    pub fn allocate_team_id(&mut self) -> Option<TeamId> {
        if self.next_team_id == u32::MAX {
            return None;
        }
        let id = TeamId(self.next_team_id);
        self.next_team_id += 1;
        Some(id)
    }

    /// Number of player ids still available to [`AddPlayer`](crate::command::AddPlayer)
    /// and [`ImportPlayers`](crate::command::ImportPlayers).
    pub fn player_ids_remaining(&self) -> u32 {
        u32::MAX - self.next_player_id
    }

    /// Verifies every global invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.teams.len() != self.definitions.len() {
            return Err(InvariantViolation::TeamCountMismatch {
                teams: self.teams.len(),
                definitions: self.definitions.len(),
            });
        }

        let mut ids = HashSet::new();
        for def in &self.definitions {
            if !ids.insert(def.id) {
                return Err(InvariantViolation::DuplicateDefinition(def.id));
            }
            if def.size == 0 {
                return Err(InvariantViolation::EmptyDefinition(def.id));
            }
        }

        let mut seen = HashSet::new();
        for (index, (team, def)) in self.teams.iter().zip(&self.definitions).enumerate() {
            if team.definition != def.id {
                return Err(InvariantViolation::TeamDefinitionMismatch {
                    index,
                    expected: def.id,
                });
            }
            if team.slots.len() != def.size {
                return Err(InvariantViolation::SlotCountMismatch {
                    team: team.definition,
                    expected: def.size,
                    actual: team.slots.len(),
                });
            }
            for (slot, held) in team.slots.iter().enumerate() {
                let Some(held) = held else { continue };
                let Some(current) = self.player(held.id) else {
                    return Err(InvariantViolation::UnknownPlayer {
                        player: held.id,
                        team: team.definition,
                        slot,
                    });
                };
                if current != held {
                    return Err(InvariantViolation::StaleCopy {
                        player: held.id,
                        team: team.definition,
                        slot,
                    });
                }
                if !seen.insert(held.id) {
                    return Err(InvariantViolation::DuplicateAssignment { player: held.id });
                }
            }
        }
        Ok(())
    }

    // ===== crate-internal mutation (commands only) =====

    /// Returns `None` once the id space is used up.
    pub(crate) fn allocate_player_id(&mut self) -> Option<PlayerId> {
        if self.next_player_id == u32::MAX {
            return None;
        }
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        Some(id)
    }

    /// Keeps the team id allocator ahead of externally chosen ids.
    pub(crate) fn reserve_team_id(&mut self, id: TeamId) {
        self.next_team_id = self.next_team_id.max(id.0.saturating_add(1));
    }

    pub(crate) fn players_mut(&mut self) -> &mut Vec<Player> {
        &mut self.players
    }

    pub(crate) fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.definition == id)
    }

    pub(crate) fn teams_mut(&mut self) -> &mut Vec<Team> {
        &mut self.teams
    }

    pub(crate) fn replace_definitions(&mut self, definitions: Vec<TeamDefinition>) {
        self.definitions = definitions;
    }

    /// Mutable access to two slots at once; the slots may belong to the same team.
    ///
    /// Returns `None` if either address is missing or both name the same slot.
    pub(crate) fn slot_pair_mut(
        &mut self,
        first: (TeamId, usize),
        second: (TeamId, usize),
    ) -> Option<(&mut Slot, &mut Slot)> {
        if first == second {
            return None;
        }
        let first_team = self.teams.iter().position(|t| t.definition == first.0)?;
        let second_team = self.teams.iter().position(|t| t.definition == second.0)?;

        if first_team == second_team {
            let slots = &mut self.teams[first_team].slots;
            if first.1 >= slots.len() || second.1 >= slots.len() {
                return None;
            }
            let (low, high, flipped) = if first.1 < second.1 {
                (first.1, second.1, false)
            } else {
                (second.1, first.1, true)
            };
            let (head, tail) = slots.split_at_mut(high);
            let (a, b) = (&mut head[low], &mut tail[0]);
            return Some(if flipped { (b, a) } else { (a, b) });
        }

        let (low, high, flipped) = if first_team < second_team {
            (first_team, second_team, false)
        } else {
            (second_team, first_team, true)
        };
        let (head, tail) = self.teams.split_at_mut(high);
        let (low_team, high_team) = (&mut head[low], &mut tail[0]);
        let (low_slot, high_slot) = if flipped {
            (second.1, first.1)
        } else {
            (first.1, second.1)
        };
        let a = low_team.slots.get_mut(low_slot)?;
        let b = high_team.slots.get_mut(high_slot)?;
        Some(if flipped { (b, a) } else { (a, b) })
    }
}

impl Default for RosterState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, name: &str, gender: Gender, skill: &str) -> Player {
        Player::new(PlayerId(id), name, gender, skill)
    }

    fn snapshot_with_team() -> RosterSnapshot {
        let def = TeamDefinition::new(TeamId(3), "Reds", 3);
        let a = player(1, "Ana", Gender::Female, "Goalie");
        let b = player(2, "Ben", Gender::Male, "Defender");
        let team = Team {
            definition: def.id,
            name: def.name.clone(),
            slots: vec![Some(a.clone()), None, Some(b.clone())],
        };
        RosterSnapshot {
            players: vec![a, b, player(5, "Cy", Gender::Other, "Wing")],
            definitions: vec![def],
            teams: vec![team],
        }
    }

    #[test]
    fn from_snapshot_resumes_allocators() {
        let mut state = RosterState::from_snapshot(snapshot_with_team());
        assert_eq!(state.allocate_player_id(), Some(PlayerId(6)));
        assert_eq!(state.allocate_team_id(), Some(TeamId(4)));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn from_snapshot_clears_unknown_and_duplicate_slots() {
        let mut snapshot = snapshot_with_team();
        let ghost = player(42, "Ghost", Gender::Male, "Wing");
        let dup = snapshot.players[0].clone();
        snapshot.teams[0].slots = vec![Some(ghost), Some(dup.clone()), Some(dup)];

        let state = RosterState::from_snapshot(snapshot);
        let team = state.team(TeamId(3)).unwrap();
        assert_eq!(team.occupant(0), None);
        assert_eq!(team.occupant(1), Some(PlayerId(1)));
        assert_eq!(team.occupant(2), None);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn from_snapshot_refreshes_stale_copies() {
        let mut snapshot = snapshot_with_team();
        snapshot.players[0].skill = "Striker".into();

        let state = RosterState::from_snapshot(snapshot);
        let held = state.team(TeamId(3)).unwrap().slots[0].as_ref().unwrap();
        assert_eq!(held.skill, "Striker");
    }

    #[test]
    fn unassigned_is_pool_minus_seated() {
        let state = RosterState::from_snapshot(snapshot_with_team());
        let unassigned: Vec<_> = state.unassigned_players().iter().map(|p| p.id).collect();
        assert_eq!(unassigned, vec![PlayerId(5)]);

        assert_eq!(
            state.placement(PlayerId(2)),
            Some(Placement::Assigned {
                team: TeamId(3),
                slot: 2
            })
        );
        assert_eq!(state.placement(PlayerId(5)), Some(Placement::Unassigned));
        assert_eq!(state.placement(PlayerId(99)), None);
    }

    #[test]
    fn slot_pair_mut_handles_same_team_in_either_order() {
        let mut state = RosterState::from_snapshot(snapshot_with_team());
        let (a, b) = state
            .slot_pair_mut((TeamId(3), 2), (TeamId(3), 0))
            .unwrap();
        assert_eq!(a.as_ref().map(|p| p.id), Some(PlayerId(2)));
        assert_eq!(b.as_ref().map(|p| p.id), Some(PlayerId(1)));

        assert!(state.slot_pair_mut((TeamId(3), 1), (TeamId(3), 1)).is_none());
        assert!(state.slot_pair_mut((TeamId(3), 0), (TeamId(3), 9)).is_none());
    }

    #[test]
    fn distinct_skills_folds_case() {
        let mut snapshot = snapshot_with_team();
        snapshot
            .players
            .push(player(6, "Di", Gender::Female, "goalie"));
        let state = RosterState::from_snapshot(snapshot);
        assert_eq!(state.distinct_skills(), vec!["Goalie", "Defender", "Wing"]);
    }

    #[test]
    fn from_snapshot_drops_repeated_and_empty_definitions() {
        let mut snapshot = snapshot_with_team();
        snapshot
            .definitions
            .push(TeamDefinition::new(TeamId(3), "Reds again", 2));
        snapshot
            .definitions
            .push(TeamDefinition::new(TeamId(7), "Nobody", 0));

        let state = RosterState::from_snapshot(snapshot);
        assert_eq!(state.definitions().len(), 1);
        assert_eq!(state.definitions()[0].name, "Reds");
        assert_eq!(state.teams().len(), 1);
        assert_eq!(state.team(TeamId(3)).unwrap().occupant(0), Some(PlayerId(1)));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn invariants_reject_repeated_definition_ids() {
        let mut state = RosterState::from_snapshot(snapshot_with_team());
        let def = state.definitions()[0].clone();
        let team = state.teams()[0].clone();
        state.replace_definitions(vec![def.clone(), def]);
        state.teams_mut().push(team);

        assert_eq!(
            state.check_invariants(),
            Err(InvariantViolation::DuplicateDefinition(TeamId(3)))
        );
    }

    #[test]
    fn allocators_stop_at_the_top_of_the_id_space() {
        let mut snapshot = snapshot_with_team();
        snapshot
            .players
            .push(player(u32::MAX, "Max", Gender::Male, "Wing"));
        snapshot
            .definitions
            .push(TeamDefinition::new(TeamId(u32::MAX - 1), "Last", 1));

        let mut state = RosterState::from_snapshot(snapshot);
        assert_eq!(state.player_ids_remaining(), 0);
        assert_eq!(state.allocate_player_id(), None);
        assert_eq!(state.allocate_team_id(), None);
        assert_eq!(state.players().len(), 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_ids_transparently() {
        let snapshot = snapshot_with_team();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["players"][0]["id"], 1);
        assert_eq!(json["teams"][0]["definition"], 3);
        assert_eq!(json["teams"][0]["slots"][1], serde_json::Value::Null);

        let back: RosterSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
