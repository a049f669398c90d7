//! Deterministic roster logic shared by the runtime and offline tools.
//!
//! `roster-core` defines the canonical rules for a squad of players, the team
//! templates they are assigned against, and the per-slot assignments. All
//! state mutation flows through [`engine::RosterEngine`]; derived views
//! (unassigned players, compliance reports, export cards) are computed on
//! demand from the owned [`RosterState`].
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod schema;
pub mod selection;
pub mod state;
pub mod validate;

pub use command::{
    AddPlayer, Applied, AssignmentError, CommandResult, CommandTransition, DefinitionError,
    DeletePlayer, ImportPlayers, MoveToSquad, MoveToTeam, PlayerError, RosterCommand,
    SetTeamDefinitions, Swap, UpdatePlayer,
};
pub use config::{RoleQuotaPolicy, RosterConfig, SchemaLimits};
pub use engine::{CommandOutcome, ExecuteError, PhaseError, RosterEngine, TransitionPhase};
pub use error::{ErrorSeverity, RosterError};
pub use export::{CardLine, CardPlayer, ExportCard, ExportError};
pub use reconcile::reconcile;
pub use schema::{SchemaViolation, validate_definitions, validate_player_draft};
pub use selection::{SelectionChange, SwapSelection};
pub use state::{
    ChangeSet, Gender, InvariantViolation, Placement, Player, PlayerDraft, PlayerId,
    RoleRequirement, RoleRequirementId, RosterSnapshot, RosterState, SelectedPlayer, Slot, Team,
    TeamDefinition, TeamId,
};
pub use validate::{
    ComplianceIssue, ComplianceReport, RoleShortfall, TeamStatus, validate, validate_all,
    validate_with,
};
