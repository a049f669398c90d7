pub mod ids;
pub mod player;
pub mod team;

pub use ids::{PlayerId, RoleRequirementId, TeamId};
pub use player::{Gender, Player, PlayerDraft, normalize_role};
pub use team::{RoleRequirement, SelectedPlayer, Slot, Team, TeamDefinition};
