//! Structural alignment of teams with their definitions.

use std::collections::HashMap;

use crate::state::{Team, TeamDefinition, TeamId};

/// Derives the team list for `definitions` from the previous `teams`.
///
/// - Teams keep their slot contents up to the smaller of the old and new size;
///   extra slots are padded with empty markers, surplus slots are dropped.
/// - Definitions without a matching team get a fresh team of empty slots.
/// - Teams whose definition disappeared are dropped.
/// - Team names are always re-synced from their definition.
///
/// Players in dropped slots or dropped teams simply stop being referenced and
/// therefore show up as unassigned.
///
/// Pure function: callers decide when to reconcile, nothing here is triggered
/// implicitly.
pub fn reconcile(definitions: &[TeamDefinition], teams: Vec<Team>) -> Vec<Team> {
    let mut existing: HashMap<TeamId, Team> = teams
        .into_iter()
        .map(|team| (team.definition, team))
        .collect();

    definitions
        .iter()
        .map(|def| match existing.remove(&def.id) {
            Some(mut team) => {
                team.slots.truncate(def.size);
                team.slots.resize(def.size, None);
                team.name.clone_from(&def.name);
                team
            }
            None => Team::empty(def),
        })
        .collect()
}
