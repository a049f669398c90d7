use super::PlayerId;

/// Declared gender of a player.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Player fields supplied by the caller (or a generator) before an id exists.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerDraft {
    pub name: String,
    pub gender: Gender,
    /// Free-text role label, e.g. "Goalie".
    pub skill: String,
}

impl PlayerDraft {
    pub fn new(name: impl Into<String>, gender: Gender, skill: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender,
            skill: skill.into(),
        }
    }
}

/// A member of the squad.
///
/// Team slots hold copies of this record; the roster store keeps every copy
/// in sync with the pool entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gender: Gender,
    pub skill: String,
}

impl Player {
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        gender: Gender,
        skill: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            gender,
            skill: skill.into(),
        }
    }

    pub fn from_draft(id: PlayerId, draft: PlayerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            gender: draft.gender,
            skill: draft.skill,
        }
    }

    /// Returns true if this player's skill matches `role`, ignoring case and
    /// surrounding whitespace.
    pub fn plays(&self, role: &str) -> bool {
        normalize_role(&self.skill) == normalize_role(role)
    }

    #[inline]
    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }
}

/// Canonical form of a role label used for comparisons.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_matching_ignores_case_and_padding() {
        let player = Player::new(PlayerId(1), "Ana", Gender::Female, " goalie");
        assert!(player.plays("Goalie"));
        assert!(player.plays("GOALIE "));
        assert!(!player.plays("Defender"));
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::Other.to_string(), "Other");
    }
}
