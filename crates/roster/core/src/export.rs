//! Consistent hand-off of a finished team to the export collaborator.

use std::collections::HashSet;

use crate::state::{Gender, PlayerId, Team, TeamDefinition, TeamId};
use crate::validate::{TeamStatus, validate};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("{team} has {actual} slots but its definition requires {expected}")]
    SlotCountMismatch {
        team: TeamId,
        expected: usize,
        actual: usize,
    },

    #[error("{player} appears more than once in {team}")]
    DuplicatePlayer { team: TeamId, player: PlayerId },

    #[error("team {team} paired with definition {definition}")]
    DefinitionMismatch { team: TeamId, definition: TeamId },

    #[error("{0} has no players to export")]
    EmptyTeam(TeamId),
}

/// One rendered line of a card: a slot and its occupant, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardLine {
    pub slot: usize,
    pub player: Option<CardPlayer>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardPlayer {
    pub id: PlayerId,
    pub name: String,
    pub skill: String,
    pub gender: Gender,
}

/// Everything the export collaborator needs to render a team card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportCard {
    pub team: TeamId,
    pub name: String,
    pub filled: usize,
    pub size: usize,
    pub status: TeamStatus,
    pub lines: Vec<CardLine>,
}

impl ExportCard {
    pub fn build(team: &Team, definition: &TeamDefinition) -> Result<Self, ExportError> {
        if team.definition != definition.id {
            return Err(ExportError::DefinitionMismatch {
                team: team.definition,
                definition: definition.id,
            });
        }
        if team.slots.len() != definition.size {
            return Err(ExportError::SlotCountMismatch {
                team: team.definition,
                expected: definition.size,
                actual: team.slots.len(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = team.players().find(|p| !seen.insert(p.id)) {
            return Err(ExportError::DuplicatePlayer {
                team: team.definition,
                player: dup.id,
            });
        }
        if !team.has_players() {
            return Err(ExportError::EmptyTeam(team.definition));
        }

        let lines = team
            .slots
            .iter()
            .enumerate()
            .map(|(slot, held)| CardLine {
                slot,
                player: held.as_ref().map(|p| CardPlayer {
                    id: p.id,
                    name: p.name.clone(),
                    skill: p.skill.clone(),
                    gender: p.gender,
                }),
            })
            .collect();

        Ok(Self {
            team: team.definition,
            name: definition.name.clone(),
            filled: team.player_count(),
            size: definition.size,
            status: validate(team, definition).status(),
            lines,
        })
    }

    /// File name stem for the rendered card, e.g. `First_Team_card`.
    pub fn file_stem(&self) -> String {
        let joined = self.name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{joined}_card")
    }

    /// `filled / size players`
    pub fn headline(&self) -> String {
        format!("{} / {} players", self.filled, self.size)
    }
}
