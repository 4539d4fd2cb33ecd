//! End-to-end engine scenarios driven through the public API.

use clue_less::{
    Engine, GameError,
    board,
    constants::SUSPECTS,
    entities::{Card, CaseFile, Character, Game, Location, Player, Room, Username, Weapon},
    messages::{Outgoing, Recipient, ServerEvent},
    store::{GameStore, MemoryStore},
};

const CASE_FILE: CaseFile = CaseFile {
    suspect: Character::MrsWhite,
    weapon: Weapon::Revolver,
    room: Room::Ballroom,
};

/// A begun three-player game with a fixed case file and hand-picked cards,
/// built through the store API the way any persistence backend would.
fn scripted_game() -> Engine<MemoryStore> {
    let mut store = MemoryStore::new();
    let mut game = Game::new(1);
    store.create_game(&game).unwrap();

    let seats = [
        ("alice", Vec::new()),
        ("bob", vec![Card::Weapon(Weapon::Rope)]),
        ("carol", vec![Card::Room(Room::Hall)]),
    ];
    for (i, (name, hand)) in seats.into_iter().enumerate() {
        let character = SUSPECTS[i];
        let mut player = Player::new(
            1,
            Username::new(name),
            character,
            board::starting_location(character),
        );
        player.turn = i == 0;
        player.hand = hand;
        store.create_player(&player).unwrap();
        game.players_list.push(Username::new(name));
    }
    game.begun = true;
    game.case_file = Some(CASE_FILE);
    store.save_game(&game).unwrap();

    Engine::new(store, 1)
}

fn broadcast_events(events: &[Outgoing]) -> Vec<&ServerEvent> {
    events
        .iter()
        .filter(|e| e.to == Recipient::All)
        .map(|e| &e.event)
        .collect()
}

#[test]
fn lobby_fills_starts_and_deals() {
    let mut engine = Engine::new(MemoryStore::with_game(1), 1);
    for name in ["alice", "bob", "carol"] {
        engine.join(&Username::new(name)).unwrap();
    }
    let events = engine.start_game(&Username::new("alice")).unwrap();
    assert!(broadcast_events(&events)
        .iter()
        .any(|e| matches!(e, ServerEvent::GameStarted)));

    let state = engine.snapshot().unwrap();
    assert!(state.begun);
    assert!(state.game_is_active);
    assert!(state.case_file.is_none(), "case file leaked mid-game");
    assert_eq!(state.players.len(), 3);
    assert_eq!(state.players.iter().filter(|p| p.turn).count(), 1);
}

#[test]
fn scripted_game_plays_to_a_win() {
    let mut engine = scripted_game();
    let alice = Username::new("alice");
    let bob = Username::new("bob");
    let carol = Username::new("carol");

    // Alice (Miss Scarlet) steps from Hallway2 into the Hall and suggests;
    // Bob holds the Rope and disproves with his only match, which ends
    // Alice's turn.
    engine.move_to(&alice, Location::Room(Room::Hall)).unwrap();
    let events = engine
        .suggest(&alice, Character::MrGreen, Weapon::Rope, Room::Hall)
        .unwrap();
    let reveal = events
        .iter()
        .find(|e| {
            matches!(&e.event, ServerEvent::Popup { message } if message.contains("Rope"))
        })
        .unwrap();
    assert_eq!(reveal.to, Recipient::Player(alice.clone()));

    // Bob's turn: he moves and accuses incorrectly, eliminating himself.
    assert_eq!(
        engine.move_to(&alice, Location::Room(Room::Study)),
        Err(GameError::NotYourTurn)
    );
    engine.move_to(&bob, Location::Room(Room::Study)).unwrap();
    let events = engine
        .accuse(&bob, Character::MrsWhite, Weapon::Revolver, Room::Kitchen)
        .unwrap();
    assert!(broadcast_events(&events).iter().any(|e| matches!(
        e,
        ServerEvent::PlayerEliminated { username } if *username == bob
    )));

    // Carol's turn: she accuses correctly and wins.
    let events = engine
        .accuse(&carol, CASE_FILE.suspect, CASE_FILE.weapon, CASE_FILE.room)
        .unwrap();
    assert!(broadcast_events(&events).iter().any(|e| matches!(
        e,
        ServerEvent::GameEnd { winner, .. } if *winner == carol
    )));

    let state = engine.snapshot().unwrap();
    assert!(!state.game_is_active);
    assert_eq!(state.case_file, Some(CASE_FILE), "solution revealed at game end");

    // The finished game rejects further play.
    assert_eq!(
        engine.move_to(&carol, Location::Room(Room::Hall)),
        Err(GameError::GameNotActive)
    );
}

#[test]
fn eliminated_players_are_skipped_until_a_tie() {
    let mut engine = scripted_game();
    let alice = Username::new("alice");
    let bob = Username::new("bob");
    let carol = Username::new("carol");
    let wrong = (Character::ColMustard, Weapon::Knife, Room::Study);

    engine.accuse(&alice, wrong.0, wrong.1, wrong.2).unwrap();
    engine.accuse(&bob, wrong.0, wrong.1, wrong.2).unwrap();
    // Carol alone survives and keeps the turn across cycles.
    engine
        .move_to(&carol, Location::Room(Room::Conservatory))
        .unwrap();
    engine.end_turn(&carol).unwrap();
    engine
        .move_to(&carol, Location::Room(Room::Lounge))
        .unwrap();
    engine.end_turn(&carol).unwrap();

    let events = engine.accuse(&carol, wrong.0, wrong.1, wrong.2).unwrap();
    assert!(broadcast_events(&events)
        .iter()
        .any(|e| matches!(e, ServerEvent::GameTie { .. })));
    assert!(!engine.snapshot().unwrap().game_is_active);
}

#[test]
fn every_operation_ends_with_a_versioned_snapshot() {
    let mut engine = Engine::new(MemoryStore::with_game(1), 1);
    let mut last_seq = 0;
    for name in ["alice", "bob"] {
        let events = engine.join(&Username::new(name)).unwrap();
        match &events.last().unwrap().event {
            ServerEvent::GameUpdate { state } => {
                assert!(state.seq > last_seq, "seq must be monotonic");
                last_seq = state.seq;
            }
            other => panic!("expected trailing game_update, got {other:?}"),
        }
    }
    let events = engine.start_game(&Username::new("alice")).unwrap();
    match &events.last().unwrap().event {
        ServerEvent::GameUpdate { state } => assert!(state.seq > last_seq),
        other => panic!("expected trailing game_update, got {other:?}"),
    }
}
