//! Two-step swap gesture buffer.
//!
//! The UI collects up to two [`SelectedPlayer`]s and then confirms; the pair
//! becomes a [`Swap`](crate::command::Swap) command. The buffer is transient
//! and never persisted.

use arrayvec::ArrayVec;

use crate::command::RosterCommand;
use crate::state::SelectedPlayer;

/// How a call to [`SwapSelection::select`] changed the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    /// The selection was added; the buffer now holds `held` entries.
    Added { held: usize },
    /// The same player was picked again; the buffer is empty.
    Deselected,
    /// The buffer was full; it now holds only the new selection.
    Restarted,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapSelection {
    picks: ArrayVec<SelectedPlayer, 2>,
}

impl SwapSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, selection: SelectedPlayer) -> SelectionChange {
        if self.picks.iter().any(|p| p.player == selection.player) {
            self.picks.clear();
            return SelectionChange::Deselected;
        }
        if self.picks.is_full() {
            self.picks.clear();
            self.picks.push(selection);
            return SelectionChange::Restarted;
        }
        self.picks.push(selection);
        SelectionChange::Added {
            held: self.picks.len(),
        }
    }

    /// Takes the pair if exactly two selections are held.
    ///
    /// The buffer is cleared whenever a pair is returned, regardless of what
    /// the caller later does with it. With fewer than two it is left as is.
    pub fn confirm(&mut self) -> Option<(SelectedPlayer, SelectedPlayer)> {
        if !self.picks.is_full() {
            return None;
        }
        let pair = (self.picks[0], self.picks[1]);
        self.picks.clear();
        Some(pair)
    }

    /// Like [`confirm`](Self::confirm) but yields the swap command directly.
    pub fn confirm_command(&mut self) -> Option<RosterCommand> {
        self.confirm()
            .map(|(first, second)| RosterCommand::swap(first, second))
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }

    pub fn selected(&self) -> &[SelectedPlayer] {
        &self.picks
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}
