//! Session worker that owns the authoritative [`roster_core::RosterState`].
//!
//! Receives commands from [`SessionHandle`](crate::api::SessionHandle),
//! executes them via [`roster_core::RosterEngine`], publishes events to the
//! EventBus, and feeds every new revision to the persistence worker.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use roster_core::{
    CommandOutcome, ComplianceReport, ExportCard, Player, PlayerDraft, RosterCommand, RosterConfig,
    RosterEngine, RosterError, RosterSnapshot, RosterState, SchemaLimits, SchemaViolation,
    SelectedPlayer, SelectionChange, SwapSelection, validate_all, validate_definitions,
    validate_player_draft,
};

use super::persistence::PersistenceLink;
use crate::api::{Identity, Result, RuntimeError, SessionPhase, SessionStatus};
use crate::events::{Event, EventBus, RosterEvent};

/// Commands that can be sent to the session worker
pub(crate) enum Command {
    /// Claim the session for `identity` while its roster loads.
    BeginLoad {
        identity: Identity,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Install the loaded roster and start accepting commands.
    Activate {
        state: Box<RosterState>,
        load_failed: bool,
        link: PersistenceLink,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Drop the session and return to `NotReady`.
    Reset {
        reply: oneshot::Sender<Result<Option<Identity>>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Execute {
        command: RosterCommand,
        reply: oneshot::Sender<Result<CommandOutcome>>,
    },
    SelectForSwap {
        selection: SelectedPlayer,
        reply: oneshot::Sender<Result<SelectionChange>>,
    },
    ConfirmSwap {
        reply: oneshot::Sender<Result<Option<CommandOutcome>>>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<RosterSnapshot>>,
    },
    Reports {
        reply: oneshot::Sender<Result<Vec<ComplianceReport>>>,
    },
    ExportCards {
        reply: oneshot::Sender<Result<Vec<ExportCard>>>,
    },
    Unassigned {
        reply: oneshot::Sender<Result<Vec<Player>>>,
    },
    DistinctSkills {
        reply: oneshot::Sender<Result<Vec<String>>>,
    },
    /// Save the latest revision now.
    Flush {
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stop the worker loop.
    Shutdown,
}

struct Session {
    identity: Identity,
    state: RosterState,
    selection: SwapSelection,
    revision: u64,
    load_failed: bool,
    link: PersistenceLink,
}

enum Phase {
    NotReady,
    Loading { identity: Identity },
    Ready(Box<Session>),
}

impl Phase {
    fn kind(&self) -> SessionPhase {
        match self {
            Phase::NotReady => SessionPhase::NotReady,
            Phase::Loading { .. } => SessionPhase::Loading,
            Phase::Ready(_) => SessionPhase::Ready,
        }
    }

    fn session(&self) -> Result<&Session> {
        match self {
            Phase::Ready(session) => Ok(session.as_ref()),
            other => Err(RuntimeError::NotReady(other.kind())),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        match self {
            Phase::Ready(session) => Ok(session.as_mut()),
            other => Err(RuntimeError::NotReady(other.kind())),
        }
    }
}

/// Background task that serializes every roster mutation and query.
pub(crate) struct SessionWorker {
    phase: Phase,
    config: RosterConfig,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SessionWorker {
    pub fn new(
        config: RosterConfig,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            phase: Phase::NotReady,
            config,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if matches!(cmd, Command::Shutdown) {
                debug!(target: "roster::session", "shutdown command received");
                break;
            }
            self.handle_command(cmd).await;
        }
        debug!(target: "roster::session", "session worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::BeginLoad { identity, reply } => {
                let result = self.begin_load(identity);
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "BeginLoad reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Activate {
                state,
                load_failed,
                link,
                reply,
            } => {
                let result = self.activate(*state, load_failed, link);
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "Activate reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Reset { reply } => {
                let previous = std::mem::replace(&mut self.phase, Phase::NotReady);
                let identity = match previous {
                    Phase::NotReady => None,
                    Phase::Loading { identity } => Some(identity),
                    Phase::Ready(session) => Some(session.identity),
                };
                if reply.send(Ok(identity)).is_err() {
                    debug!(
                        target: "roster::session",
                        "Reset reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Status { reply } => {
                if reply.send(self.status()).is_err() {
                    debug!(
                        target: "roster::session",
                        "Status reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Execute { command, reply } => {
                let result = self.handle_execute(&command);
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "Execute reply channel closed (caller dropped)"
                    );
                }
            }
            Command::SelectForSwap { selection, reply } => {
                let result = self
                    .phase
                    .session_mut()
                    .map(|session| session.selection.select(selection));
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "SelectForSwap reply channel closed (caller dropped)"
                    );
                }
            }
            Command::ConfirmSwap { reply } => {
                let result = self.handle_confirm_swap();
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "ConfirmSwap reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Snapshot { reply } => {
                let result = self.phase.session().map(|s| s.state.snapshot());
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "Snapshot reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Reports { reply } => {
                let policy = self.config.role_policy;
                let result = self
                    .phase
                    .session()
                    .map(|s| validate_all(&s.state, policy));
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "Reports reply channel closed (caller dropped)"
                    );
                }
            }
            Command::ExportCards { reply } => {
                let result = self.phase.session().map(export_cards);
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "ExportCards reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Unassigned { reply } => {
                let result = self
                    .phase
                    .session()
                    .map(|s| s.state.unassigned_players().into_iter().cloned().collect());
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "Unassigned reply channel closed (caller dropped)"
                    );
                }
            }
            Command::DistinctSkills { reply } => {
                let result = self.phase.session().map(|s| s.state.distinct_skills());
                if reply.send(result).is_err() {
                    debug!(
                        target: "roster::session",
                        "DistinctSkills reply channel closed (caller dropped)"
                    );
                }
            }
            Command::Flush { reply } => match self.phase.session() {
                Ok(session) => session.link.flush(reply).await,
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            Command::Shutdown => {}
        }
    }

    fn begin_load(&mut self, identity: Identity) -> Result<()> {
        match &self.phase {
            Phase::NotReady => {
                debug!(target: "roster::session", identity = %identity, "loading roster");
                self.phase = Phase::Loading { identity };
                Ok(())
            }
            Phase::Loading { identity: current } => {
                Err(RuntimeError::AlreadyLoggedIn(current.clone()))
            }
            Phase::Ready(session) => Err(RuntimeError::AlreadyLoggedIn(session.identity.clone())),
        }
    }

    fn activate(
        &mut self,
        state: RosterState,
        load_failed: bool,
        link: PersistenceLink,
    ) -> Result<()> {
        let identity = match &self.phase {
            Phase::Loading { identity } => identity.clone(),
            Phase::Ready(session) => {
                return Err(RuntimeError::AlreadyLoggedIn(session.identity.clone()));
            }
            Phase::NotReady => return Err(RuntimeError::NotLoggedIn),
        };

        info!(
            target: "roster::session",
            identity = %identity,
            players = state.players().len(),
            teams = state.teams().len(),
            load_failed,
            "session ready"
        );

        self.phase = Phase::Ready(Box::new(Session {
            identity,
            state,
            selection: SwapSelection::new(),
            revision: 0,
            load_failed,
            link,
        }));
        Ok(())
    }

    fn status(&self) -> SessionStatus {
        match &self.phase {
            Phase::NotReady => SessionStatus {
                phase: SessionPhase::NotReady,
                identity: None,
                revision: 0,
                load_failed: false,
            },
            Phase::Loading { identity } => SessionStatus {
                phase: SessionPhase::Loading,
                identity: Some(identity.clone()),
                revision: 0,
                load_failed: false,
            },
            Phase::Ready(session) => SessionStatus {
                phase: SessionPhase::Ready,
                identity: Some(session.identity.clone()),
                revision: session.revision,
                load_failed: session.load_failed,
            },
        }
    }

    fn handle_execute(&mut self, command: &RosterCommand) -> Result<CommandOutcome> {
        let session = self.phase.session_mut()?;
        check_schema(command, &self.config.schema)?;
        session.execute(command, &self.event_bus)
    }

    fn handle_confirm_swap(&mut self) -> Result<Option<CommandOutcome>> {
        let session = self.phase.session_mut()?;
        let Some(command) = session.selection.confirm_command() else {
            return Ok(None);
        };
        session.execute(&command, &self.event_bus).map(Some)
    }
}

impl Session {
    /// Runs one command through the engine and announces the result.
    fn execute(&mut self, command: &RosterCommand, event_bus: &EventBus) -> Result<CommandOutcome> {
        let mut engine = RosterEngine::new(&mut self.state);

        match engine.execute(command) {
            Ok(outcome) => {
                if outcome.is_noop() {
                    debug!(
                        target: "roster::session",
                        command = command.name(),
                        "command was a no-op"
                    );
                    return Ok(outcome);
                }

                self.revision += 1;
                self.link.publish(self.revision, self.state.snapshot());

                debug!(
                    target: "roster::session",
                    command = command.name(),
                    revision = self.revision,
                    changes = ?outcome.changes,
                    "command applied"
                );
                event_bus.publish(Event::Roster(RosterEvent::StateChanged {
                    revision: self.revision,
                    command: command.name().to_string(),
                    changes: outcome.changes,
                }));
                Ok(outcome)
            }
            Err(error) => {
                if error.severity().is_internal() {
                    error!(
                        target: "roster::session",
                        command = command.name(),
                        code = error.error_code(),
                        phase = error.phase().as_str(),
                        "command broke a roster invariant: {}",
                        error
                    );
                } else {
                    warn!(
                        target: "roster::session",
                        command = command.name(),
                        code = error.error_code(),
                        phase = error.phase().as_str(),
                        "command rejected: {}",
                        error
                    );
                }
                event_bus.publish(Event::Roster(RosterEvent::CommandRejected {
                    command: command.name().to_string(),
                    code: error.error_code().to_string(),
                    message: error.to_string(),
                }));
                Err(RuntimeError::Rejected(error))
            }
        }
    }
}

/// Cards for every team with at least one player. Inconsistent teams are
/// skipped with a warning.
fn export_cards(session: &Session) -> Vec<ExportCard> {
    session
        .state
        .team_pairs()
        .filter(|(team, _)| team.has_players())
        .filter_map(|(team, definition)| match ExportCard::build(team, definition) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!(
                    target: "roster::session",
                    team = %definition.id,
                    "skipping export card: {}",
                    e
                );
                None
            }
        })
        .collect()
}

/// Rejects malformed user input before it reaches the engine.
fn check_schema(command: &RosterCommand, limits: &SchemaLimits) -> Result<()> {
    let violations = match command {
        RosterCommand::AddPlayer(cmd) => validate_player_draft(&cmd.draft, limits),
        RosterCommand::ImportPlayers(cmd) => cmd
            .drafts
            .iter()
            .enumerate()
            .flat_map(|(index, draft)| {
                validate_player_draft(draft, limits)
                    .into_iter()
                    .map(move |v| SchemaViolation {
                        field: format!("players[{index}].{}", v.field),
                        message: v.message,
                    })
            })
            .collect(),
        RosterCommand::UpdatePlayer(cmd) => {
            let player = &cmd.player;
            let draft = PlayerDraft::new(player.name.clone(), player.gender, player.skill.clone());
            validate_player_draft(&draft, limits)
        }
        RosterCommand::SetTeamDefinitions(cmd) => validate_definitions(&cmd.definitions, limits),
        _ => Vec::new(),
    };

    if violations.is_empty() {
        Ok(())
    } else {
        warn!(
            target: "roster::session",
            command = command.name(),
            violations = violations.len(),
            "command input rejected"
        );
        Err(RuntimeError::InvalidInput(violations))
    }
}
