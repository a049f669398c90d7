use super::{Player, PlayerId, RoleRequirementId, TeamId};

/// Minimum number of players with a given role a team must field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleRequirement {
    pub id: RoleRequirementId,
    /// Role label, matched case-insensitively against player skills.
    pub role: String,
    pub count: u32,
}

impl RoleRequirement {
    pub fn new(id: RoleRequirementId, role: impl Into<String>, count: u32) -> Self {
        Self {
            id,
            role: role.into(),
            count,
        }
    }
}

/// Template a team is built and scored against.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamDefinition {
    /// Also the id of the team derived from this definition.
    pub id: TeamId,
    pub name: String,
    /// Number of slots in the team.
    pub size: usize,
    pub role_requirements: Vec<RoleRequirement>,
    /// At least one assigned player must be [`Gender::Female`](super::Gender::Female).
    pub require_female: bool,
}

impl TeamDefinition {
    pub fn new(id: TeamId, name: impl Into<String>, size: usize) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            role_requirements: Vec::new(),
            require_female: false,
        }
    }

    /// Appends a role requirement with the next free requirement id (builder pattern).
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>, count: u32) -> Self {
        let next = self
            .role_requirements
            .iter()
            .map(|req| req.id.0 + 1)
            .max()
            .unwrap_or(0);
        self.role_requirements
            .push(RoleRequirement::new(RoleRequirementId(next), role, count));
        self
    }

    #[must_use]
    pub fn with_require_female(mut self, require_female: bool) -> Self {
        self.require_female = require_female;
        self
    }
}

/// One position in a team. Holds a copy of the assigned player, if any.
pub type Slot = Option<Player>;

/// A team instance derived from a [`TeamDefinition`].
///
/// The team carries no id of its own: `definition` is both the link to its
/// template and its identity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    pub definition: TeamId,
    pub name: String,
    pub slots: Vec<Slot>,
}

impl Team {
    /// Creates a team with `definition.size` empty slots.
    pub fn empty(definition: &TeamDefinition) -> Self {
        Self {
            definition: definition.id,
            name: definition.name.clone(),
            slots: vec![None; definition.size],
        }
    }

    #[inline]
    pub fn id(&self) -> TeamId {
        self.definition
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Id of the player in `index`, or `None` if the slot is empty or missing.
    pub fn occupant(&self, index: usize) -> Option<PlayerId> {
        self.slots
            .get(index)
            .and_then(|slot| slot.as_ref())
            .map(|player| player.id)
    }

    /// Index of the slot holding `player`, if any.
    pub fn position_of(&self, player: PlayerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.id == player))
    }

    /// Assigned players in slot order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().flatten()
    }

    pub fn player_count(&self) -> usize {
        self.players().count()
    }

    pub fn has_players(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }
}

/// An assigned player picked as one half of a two-step swap gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectedPlayer {
    pub player: PlayerId,
    pub team: TeamId,
    pub slot: usize,
}

impl SelectedPlayer {
    pub fn new(player: PlayerId, team: TeamId, slot: usize) -> Self {
        Self { player, team, slot }
    }
}
