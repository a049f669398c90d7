//! Cloneable façade for issuing commands to the roster session.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! every UI intent, plus read-only queries and event subscriptions.
use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use roster_core::{
    CommandOutcome, CommandResult, ComplianceReport, ExportCard, Player, PlayerDraft, PlayerId,
    RosterCommand, RosterSnapshot, SelectedPlayer, SelectionChange, TeamDefinition, TeamId,
};

use super::errors::{Result, RuntimeError};
use super::identity::Identity;
use super::providers::PlayerGenerator;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, PersistenceLink};

/// Lifecycle of the session owned by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    /// No identity is logged in.
    NotReady,
    /// A login is in progress; the roster is not loaded yet.
    Loading,
    Ready,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::NotReady => "not ready",
            SessionPhase::Loading => "loading",
            SessionPhase::Ready => "ready",
        };
        write!(f, "{}", label)
    }
}

/// Point-in-time description of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    /// Number of state-changing commands since login.
    pub revision: u64,
    /// The load failed and the session started from an empty roster.
    pub load_failed: bool,
}

/// Client-facing handle to interact with the session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    generator: Option<Arc<dyn PlayerGenerator>>,
}

impl SessionHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        generator: Option<Arc<dyn PlayerGenerator>>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            generator,
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    // ===== lifecycle (driven by Runtime) =====

    pub(crate) async fn begin_load(&self, identity: Identity) -> Result<()> {
        self.request(|reply| Command::BeginLoad { identity, reply })
            .await
    }

    pub(crate) async fn activate(
        &self,
        state: roster_core::RosterState,
        load_failed: bool,
        link: PersistenceLink,
    ) -> Result<()> {
        self.request(|reply| Command::Activate {
            state: Box::new(state),
            load_failed,
            link,
            reply,
        })
        .await
    }

    pub(crate) async fn reset(&self) -> Result<Option<Identity>> {
        self.request(|reply| Command::Reset { reply }).await
    }

    // ===== commands =====

    /// Execute any roster command.
    pub async fn execute(&self, command: RosterCommand) -> Result<CommandOutcome> {
        self.request(|reply| Command::Execute { command, reply })
            .await
    }

    /// Add a player and return its new id.
    pub async fn add_player(&self, draft: PlayerDraft) -> Result<PlayerId> {
        let outcome = self.execute(RosterCommand::add_player(draft)).await?;
        let CommandResult::PlayerAdded(id) = outcome.result else {
            unreachable!("add_player always yields PlayerAdded");
        };
        Ok(id)
    }

    pub async fn update_player(&self, player: Player) -> Result<CommandOutcome> {
        self.execute(RosterCommand::update_player(player)).await
    }

    pub async fn delete_player(&self, player: PlayerId) -> Result<CommandOutcome> {
        self.execute(RosterCommand::delete_player(player)).await
    }

    pub async fn set_team_definitions(
        &self,
        definitions: Vec<TeamDefinition>,
    ) -> Result<CommandOutcome> {
        self.execute(RosterCommand::set_team_definitions(definitions))
            .await
    }

    pub async fn move_to_team(
        &self,
        player: PlayerId,
        team: TeamId,
        slot: usize,
    ) -> Result<CommandOutcome> {
        self.execute(RosterCommand::move_to_team(player, team, slot))
            .await
    }

    pub async fn move_to_squad(
        &self,
        player: PlayerId,
        team: TeamId,
        slot: usize,
    ) -> Result<CommandOutcome> {
        self.execute(RosterCommand::move_to_squad(player, team, slot))
            .await
    }

    pub async fn swap(
        &self,
        first: SelectedPlayer,
        second: SelectedPlayer,
    ) -> Result<CommandOutcome> {
        self.execute(RosterCommand::swap(first, second)).await
    }

    /// Add one half of a two-step swap gesture.
    pub async fn select_for_swap(&self, selection: SelectedPlayer) -> Result<SelectionChange> {
        self.request(|reply| Command::SelectForSwap { selection, reply })
            .await
    }

    /// Swap the two selected players, if two are selected.
    ///
    /// The selection is cleared whenever a pair was held, even if the swap is
    /// rejected.
    pub async fn confirm_swap(&self) -> Result<Option<CommandOutcome>> {
        self.request(|reply| Command::ConfirmSwap { reply }).await
    }

    /// Ask the injected generator for `count` players and import them.
    ///
    /// All generated drafts are imported in one step; a generator failure or
    /// an invalid draft leaves the pool untouched.
    pub async fn generate_players(&self, count: usize) -> Result<Vec<PlayerId>> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(RuntimeError::GeneratorNotSet)?;

        let existing_skills = self.distinct_skills().await?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let drafts = generator.generate(count, &existing_skills).await?;
        tracing::debug!(
            target: "roster::session",
            requested = count,
            received = drafts.len(),
            "generator returned drafts"
        );

        let outcome = self.execute(RosterCommand::import_players(drafts)).await?;
        let CommandResult::PlayersImported(ids) = outcome.result else {
            unreachable!("import_players always yields PlayersImported");
        };
        Ok(ids)
    }

    /// Persist the latest state now instead of waiting for the debounce.
    pub async fn flush(&self) -> Result<()> {
        self.request(|reply| Command::Flush { reply }).await
    }

    // ===== queries =====

    pub async fn status(&self) -> Result<SessionStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Status { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Query the current roster (read-only copy)
    pub async fn snapshot(&self) -> Result<RosterSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// One compliance report per team, in definition order.
    pub async fn reports(&self) -> Result<Vec<ComplianceReport>> {
        self.request(|reply| Command::Reports { reply }).await
    }

    /// Export cards for every team that has at least one player.
    pub async fn export_cards(&self) -> Result<Vec<ExportCard>> {
        self.request(|reply| Command::ExportCards { reply }).await
    }

    pub async fn unassigned_players(&self) -> Result<Vec<Player>> {
        self.request(|reply| Command::Unassigned { reply }).await
    }

    pub async fn distinct_skills(&self) -> Result<Vec<String>> {
        self.request(|reply| Command::DistinctSkills { reply })
            .await
    }

    // ===== events =====

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Roster` - State changes and rejected commands
    /// - `Topic::Persistence` - Save results
    /// - `Topic::Session` - Login / logout
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
