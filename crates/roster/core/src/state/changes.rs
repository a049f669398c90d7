use bitflags::bitflags;

bitflags! {
    /// Tracks which collections of a [`RosterState`](super::RosterState)
    /// changed during a command.
    ///
    /// An empty set means the command was a no-op and nothing needs to be
    /// persisted or re-rendered.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChangeSet: u8 {
        const PLAYERS     = 1 << 0;
        const DEFINITIONS = 1 << 1;
        const TEAMS       = 1 << 2;
    }
}
