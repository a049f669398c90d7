use std::sync::Arc;

use roster_core::{
    ChangeSet, Gender, Player, PlayerDraft, PlayerId, RosterSnapshot, SelectedPlayer,
    SelectionChange, TeamDefinition, TeamId,
};
use roster_runtime::{
    Event, FixedGenerator, Identity, InMemoryRosterRepo, RosterEvent, Runtime, RuntimeError,
    SessionEvent, SessionHandle, SessionPhase, Topic,
};

fn runtime(repo: Arc<InMemoryRosterRepo>) -> Runtime {
    Runtime::builder()
        .shared_repository(repo)
        .build()
        .expect("runtime builds")
}

fn runtime_with_generator(generator: FixedGenerator) -> Runtime {
    Runtime::builder()
        .repository(InMemoryRosterRepo::new())
        .generator(generator)
        .build()
        .expect("runtime builds")
}

fn draft(name: &str, gender: Gender, skill: &str) -> PlayerDraft {
    PlayerDraft::new(name, gender, skill)
}

/// Two teams of two, four players, everyone seated.
async fn seat_four(handle: &SessionHandle) -> Vec<PlayerId> {
    handle
        .set_team_definitions(vec![
            TeamDefinition::new(TeamId(1), "Reds", 2),
            TeamDefinition::new(TeamId(2), "Blues", 2),
        ])
        .await
        .unwrap();

    let mut ids = Vec::new();
    for name in ["Ana", "Ben", "Cleo", "Dan"] {
        ids.push(
            handle
                .add_player(draft(name, Gender::Female, "Wing"))
                .await
                .unwrap(),
        );
    }
    handle.move_to_team(ids[0], TeamId(1), 0).await.unwrap();
    handle.move_to_team(ids[1], TeamId(1), 1).await.unwrap();
    handle.move_to_team(ids[2], TeamId(2), 0).await.unwrap();
    handle.move_to_team(ids[3], TeamId(2), 1).await.unwrap();
    ids
}

#[tokio::test]
async fn commands_fail_before_login() {
    let rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    let handle = rt.handle();

    let status = handle.status().await.unwrap();
    assert_eq!(status.phase, SessionPhase::NotReady);
    assert_eq!(status.identity, None);

    assert!(matches!(
        handle.snapshot().await,
        Err(RuntimeError::NotReady(SessionPhase::NotReady))
    ));
    assert!(matches!(
        handle.add_player(draft("Ana", Gender::Female, "Goalie")).await,
        Err(RuntimeError::NotReady(_))
    ));
    assert!(matches!(
        handle.flush().await,
        Err(RuntimeError::NotReady(_))
    ));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn login_restores_stored_roster() {
    let repo = Arc::new(InMemoryRosterRepo::new());
    let identity = Identity::new("coach@example.com");

    // Build a roster in one session, then seed it into a fresh repository.
    let stored = {
        let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
        rt.login(identity.clone()).await.unwrap();
        let handle = rt.handle();
        seat_four(&handle).await;
        let snapshot = handle.snapshot().await.unwrap();
        rt.shutdown().await.unwrap();
        snapshot
    };
    repo.insert(identity.clone(), stored.clone()).unwrap();

    let mut rt = runtime(repo.clone());
    let status = rt.login(identity.clone()).await.unwrap();
    assert_eq!(status.phase, SessionPhase::Ready);
    assert_eq!(status.identity, Some(identity.clone()));
    assert_eq!(status.revision, 0);
    assert!(!status.load_failed);
    assert_eq!(rt.identity(), Some(&identity));

    let handle = rt.handle();
    assert_eq!(handle.snapshot().await.unwrap(), stored);
    assert!(handle.unassigned_players().await.unwrap().is_empty());

    // New ids continue after the stored ones.
    let id = handle
        .add_player(draft("Eve", Gender::Female, "Goalie"))
        .await
        .unwrap();
    assert_eq!(id, PlayerId(5));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn login_cleans_malformed_stored_roster() {
    let repo = Arc::new(InMemoryRosterRepo::new());
    let identity = Identity::new("coach@example.com");
    let stored = RosterSnapshot {
        players: vec![Player::new(PlayerId(u32::MAX), "Max", Gender::Male, "Wing")],
        definitions: vec![
            TeamDefinition::new(TeamId(1), "Reds", 2),
            TeamDefinition::new(TeamId(1), "Reds again", 3),
            TeamDefinition::new(TeamId(2), "Empty", 0),
        ],
        teams: Vec::new(),
    };
    repo.insert(identity.clone(), stored).unwrap();

    let mut rt = runtime(repo);
    let status = rt.login(identity).await.unwrap();
    assert!(!status.load_failed);

    let handle = rt.handle();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(
        snapshot.definitions,
        vec![TeamDefinition::new(TeamId(1), "Reds", 2)]
    );
    assert_eq!(snapshot.teams.len(), 1);

    // The cleaned definitions round-trip through the editor unchanged.
    let outcome = handle
        .set_team_definitions(snapshot.definitions.clone())
        .await
        .unwrap();
    assert!(outcome.is_noop());

    let err = handle
        .add_player(draft("Eve", Gender::Female, "Goalie"))
        .await
        .unwrap_err();
    assert_eq!(err.rejection_code(), Some("ids_exhausted"));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_roster_starts_empty() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    let status = rt.login(Identity::new("new-user")).await.unwrap();

    assert!(!status.load_failed);
    assert_eq!(
        rt.handle().snapshot().await.unwrap(),
        RosterSnapshot::default()
    );
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_login_is_rejected() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("first")).await.unwrap();

    let err = rt.login(Identity::new("second")).await.unwrap_err();
    assert!(matches!(err, RuntimeError::AlreadyLoggedIn(id) if id.as_str() == "first"));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn logout_resets_session_and_allows_new_login() {
    let repo = Arc::new(InMemoryRosterRepo::new());
    let mut rt = runtime(repo.clone());
    let mut session_events = rt.subscribe(Topic::Session);
    let handle = rt.handle();

    rt.login(Identity::new("alice")).await.unwrap();
    handle
        .add_player(draft("Ana", Gender::Female, "Goalie"))
        .await
        .unwrap();
    handle
        .select_for_swap(SelectedPlayer::new(PlayerId(1), TeamId(1), 0))
        .await
        .unwrap();

    rt.logout().await.unwrap();
    assert_eq!(rt.identity(), None);
    assert_eq!(handle.status().await.unwrap().phase, SessionPhase::NotReady);
    assert!(matches!(
        handle.snapshot().await,
        Err(RuntimeError::NotReady(SessionPhase::NotReady))
    ));
    assert!(matches!(rt.logout().await, Err(RuntimeError::NotLoggedIn)));

    assert_eq!(
        session_events.recv().await.unwrap(),
        Event::Session(SessionEvent::Loaded {
            identity: Identity::new("alice"),
            load_failed: false,
        })
    );
    assert_eq!(
        session_events.recv().await.unwrap(),
        Event::Session(SessionEvent::LoggedOut {
            identity: Identity::new("alice"),
        })
    );

    // A different identity starts from its own (empty) roster with no
    // leftover selection.
    rt.login(Identity::new("bob")).await.unwrap();
    assert!(handle.snapshot().await.unwrap().players.is_empty());
    assert_eq!(handle.confirm_swap().await.unwrap(), None);

    rt.logout().await.unwrap();
    rt.login(Identity::new("alice")).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().players.len(), 1);

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn state_changes_are_announced_and_noops_are_not() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();
    let mut roster_events = handle.subscribe(Topic::Roster);

    handle
        .set_team_definitions(vec![TeamDefinition::new(TeamId(1), "Reds", 2)])
        .await
        .unwrap();
    let id = handle
        .add_player(draft("Ana", Gender::Female, "Goalie"))
        .await
        .unwrap();
    handle.move_to_team(id, TeamId(1), 0).await.unwrap();

    let outcome = handle.move_to_team(id, TeamId(1), 0).await.unwrap();
    assert!(outcome.is_noop());
    assert_eq!(handle.status().await.unwrap().revision, 3);

    let mut revisions = Vec::new();
    while let Ok(event) = roster_events.try_recv() {
        if let Event::Roster(RosterEvent::StateChanged {
            revision, command, ..
        }) = event
        {
            revisions.push((revision, command));
        }
    }
    assert_eq!(
        revisions,
        vec![
            (1, "set_team_definitions".to_string()),
            (2, "add_player".to_string()),
            (3, "move_to_team".to_string()),
        ]
    );

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn occupied_slot_is_rejected_without_mutation() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();
    let ids = seat_four(&handle).await;
    let extra = handle
        .add_player(draft("Eve", Gender::Male, "Goalie"))
        .await
        .unwrap();
    let mut roster_events = handle.subscribe(Topic::Roster);
    let before = handle.snapshot().await.unwrap();

    let err = handle.move_to_team(extra, TeamId(1), 0).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.rejection_code(), Some("slot_occupied"));
    assert_eq!(handle.snapshot().await.unwrap(), before);

    match roster_events.recv().await.unwrap() {
        Event::Roster(RosterEvent::CommandRejected { command, code, .. }) => {
            assert_eq!(command, "move_to_team");
            assert_eq!(code, "slot_occupied");
        }
        other => panic!("unexpected event {other:?}"),
    }

    // Emptying the slot first makes the move legal.
    handle.move_to_squad(ids[0], TeamId(1), 0).await.unwrap();
    let outcome = handle.move_to_team(extra, TeamId(1), 0).await.unwrap();
    assert!(outcome.changes.contains(ChangeSet::TEAMS));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_input_never_reaches_the_roster() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();

    let err = handle
        .add_player(draft("A", Gender::Female, " "))
        .await
        .unwrap_err();
    let RuntimeError::InvalidInput(violations) = err else {
        panic!("expected invalid input, got {err:?}");
    };
    assert_eq!(violations.len(), 2);

    let err = handle
        .set_team_definitions(vec![
            TeamDefinition::new(TeamId(1), "Reds", 2),
            TeamDefinition::new(TeamId(2), "reds", 2),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidInput(_)));

    assert_eq!(
        handle.snapshot().await.unwrap(),
        RosterSnapshot::default()
    );
    assert_eq!(handle.status().await.unwrap().revision, 0);

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn confirm_swap_exchanges_selected_players() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();
    let ids = seat_four(&handle).await;

    // A single pick is not enough.
    let first = SelectedPlayer::new(ids[0], TeamId(1), 0);
    assert_eq!(
        handle.select_for_swap(first).await.unwrap(),
        SelectionChange::Added { held: 1 }
    );
    assert_eq!(handle.confirm_swap().await.unwrap(), None);

    let second = SelectedPlayer::new(ids[3], TeamId(2), 1);
    assert_eq!(
        handle.select_for_swap(second).await.unwrap(),
        SelectionChange::Added { held: 2 }
    );
    let outcome = handle.confirm_swap().await.unwrap().expect("pair selected");
    assert!(outcome.changes.contains(ChangeSet::TEAMS));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.teams[0].occupant(0), Some(ids[3]));
    assert_eq!(snapshot.teams[1].occupant(1), Some(ids[0]));

    // The selection was consumed.
    assert_eq!(handle.confirm_swap().await.unwrap(), None);

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn stale_swap_is_rejected_and_selection_cleared() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();
    let ids = seat_four(&handle).await;

    handle
        .select_for_swap(SelectedPlayer::new(ids[0], TeamId(1), 0))
        .await
        .unwrap();
    handle
        .select_for_swap(SelectedPlayer::new(ids[2], TeamId(2), 0))
        .await
        .unwrap();

    // Someone moves the first pick away before the swap is confirmed.
    handle.move_to_squad(ids[0], TeamId(1), 0).await.unwrap();

    let err = handle.confirm_swap().await.unwrap_err();
    assert_eq!(err.rejection_code(), Some("stale_player_reference"));
    assert_eq!(handle.confirm_swap().await.unwrap(), None);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.teams[1].occupant(0), Some(ids[2]));

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn reports_and_cards_reflect_current_teams() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();

    handle
        .set_team_definitions(vec![
            TeamDefinition::new(TeamId(1), "First Team", 2)
                .with_role("Goalie", 1)
                .with_require_female(true),
            TeamDefinition::new(TeamId(2), "Bench", 3),
        ])
        .await
        .unwrap();
    let keeper = handle
        .add_player(draft("Ana", Gender::Female, "Goalie"))
        .await
        .unwrap();
    handle.move_to_team(keeper, TeamId(1), 0).await.unwrap();

    let reports = handle.reports().await.unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].is_valid());
    assert!(!reports[0].is_complete());
    assert!(!reports[1].is_valid());

    let cards = handle.export_cards().await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].file_stem(), "First_Team_card");
    assert_eq!(cards[0].headline(), "1 / 2 players");

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn generated_players_are_imported_together() {
    let mut rt = runtime_with_generator(FixedGenerator::new(vec![
        draft("Ana", Gender::Female, "Goalie"),
        draft("Ben", Gender::Male, "Wing"),
    ]));
    let handle = rt.handle();

    assert!(matches!(
        handle.generate_players(2).await,
        Err(RuntimeError::NotReady(_))
    ));

    rt.login(Identity::new("alice")).await.unwrap();
    assert!(handle.generate_players(0).await.unwrap().is_empty());

    let ids = handle.generate_players(3).await.unwrap();
    assert_eq!(ids, vec![PlayerId(1), PlayerId(2), PlayerId(3)]);
    assert_eq!(handle.unassigned_players().await.unwrap().len(), 3);
    assert_eq!(
        handle.distinct_skills().await.unwrap(),
        vec!["Goalie".to_string(), "Wing".to_string()]
    );

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn generator_failures_leave_the_pool_untouched() {
    let mut rt = runtime_with_generator(FixedGenerator::new(Vec::new()));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();

    assert!(matches!(
        handle.generate_players(2).await,
        Err(RuntimeError::Generator(_))
    ));
    assert!(handle.snapshot().await.unwrap().players.is_empty());
    rt.shutdown().await.unwrap();

    // One malformed draft rejects the whole batch.
    let mut rt = runtime_with_generator(FixedGenerator::new(vec![
        draft("Ana", Gender::Female, "Goalie"),
        draft("B", Gender::Male, "Wing"),
    ]));
    rt.login(Identity::new("alice")).await.unwrap();
    let handle = rt.handle();

    assert!(matches!(
        handle.generate_players(2).await,
        Err(RuntimeError::InvalidInput(_))
    ));
    assert!(handle.snapshot().await.unwrap().players.is_empty());
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn generation_requires_a_generator() {
    let mut rt = runtime(Arc::new(InMemoryRosterRepo::new()));
    rt.login(Identity::new("alice")).await.unwrap();

    assert!(matches!(
        rt.handle().generate_players(1).await,
        Err(RuntimeError::GeneratorNotSet)
    ));
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn builder_requires_repository() {
    assert!(matches!(
        Runtime::builder().build(),
        Err(RuntimeError::MissingRepository)
    ));
}
