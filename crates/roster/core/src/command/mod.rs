//! Roster commands.
//!
//! Every discrete intent the UI can issue is a [`RosterCommand`]. Each variant
//! wraps a command struct implementing [`CommandTransition`], so all of them
//! run through the same pre-validate / apply / post-validate pipeline in
//! [`RosterEngine`](crate::engine::RosterEngine).
//!
//! # Module Structure
//!
//! - `roster`: pool mutations (add, import, update, delete)
//! - `definitions`: wholesale replacement of team definitions
//! - `assignment`: slot moves and swaps

pub mod assignment;
pub mod definitions;
pub mod roster;

pub use assignment::{AssignmentError, MoveToSquad, MoveToTeam, Swap};
pub use definitions::{DefinitionError, SetTeamDefinitions};
pub use roster::{AddPlayer, DeletePlayer, ImportPlayers, PlayerError, UpdatePlayer};

use crate::state::{ChangeSet, Player, PlayerDraft, PlayerId, RosterState, SelectedPlayer};
use crate::state::{TeamDefinition, TeamId};

/// Result of a successful `apply`: what changed plus the command's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied<T> {
    pub changes: ChangeSet,
    pub output: T,
}

impl<T> Applied<T> {
    pub fn new(changes: ChangeSet, output: T) -> Self {
        Self { changes, output }
    }
}

impl Applied<()> {
    /// The command left the state untouched.
    pub fn unchanged() -> Self {
        Self::new(ChangeSet::empty(), ())
    }

    pub fn changed(changes: ChangeSet) -> Self {
        Self::new(changes, ())
    }
}

/// Defines how a concrete command mutates roster state.
///
/// Conflicts must be detected in [`pre_validate`](Self::pre_validate) so that
/// a rejected command never touches the state.
pub trait CommandTransition {
    type Error;
    type Output;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &RosterState) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the command by mutating the state directly.
    fn apply(&self, state: &mut RosterState) -> Result<Applied<Self::Output>, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &RosterState) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Every intent the engine accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RosterCommand {
    AddPlayer(AddPlayer),
    ImportPlayers(ImportPlayers),
    UpdatePlayer(UpdatePlayer),
    DeletePlayer(DeletePlayer),
    SetTeamDefinitions(SetTeamDefinitions),
    MoveToTeam(MoveToTeam),
    MoveToSquad(MoveToSquad),
    Swap(Swap),
}

impl RosterCommand {
    pub fn add_player(draft: PlayerDraft) -> Self {
        Self::AddPlayer(AddPlayer { draft })
    }

    pub fn import_players(drafts: Vec<PlayerDraft>) -> Self {
        Self::ImportPlayers(ImportPlayers { drafts })
    }

    pub fn update_player(player: Player) -> Self {
        Self::UpdatePlayer(UpdatePlayer { player })
    }

    pub fn delete_player(player: PlayerId) -> Self {
        Self::DeletePlayer(DeletePlayer { player })
    }

    pub fn set_team_definitions(definitions: Vec<TeamDefinition>) -> Self {
        Self::SetTeamDefinitions(SetTeamDefinitions { definitions })
    }

    pub fn move_to_team(player: PlayerId, team: TeamId, slot: usize) -> Self {
        Self::MoveToTeam(MoveToTeam { player, team, slot })
    }

    pub fn move_to_squad(player: PlayerId, team: TeamId, slot: usize) -> Self {
        Self::MoveToSquad(MoveToSquad { player, team, slot })
    }

    pub fn swap(first: SelectedPlayer, second: SelectedPlayer) -> Self {
        Self::Swap(Swap { first, second })
    }

    /// Stable name used in logs and events.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddPlayer(_) => "add_player",
            Self::ImportPlayers(_) => "import_players",
            Self::UpdatePlayer(_) => "update_player",
            Self::DeletePlayer(_) => "delete_player",
            Self::SetTeamDefinitions(_) => "set_team_definitions",
            Self::MoveToTeam(_) => "move_to_team",
            Self::MoveToSquad(_) => "move_to_squad",
            Self::Swap(_) => "swap",
        }
    }
}

/// Command-specific payload returned on success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandResult {
    #[default]
    None,
    PlayerAdded(PlayerId),
    PlayersImported(Vec<PlayerId>),
}
