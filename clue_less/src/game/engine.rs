//! Turn and action engine.
//!
//! Every operation is validate-then-mutate: a failed validation returns a
//! [`GameError`] and leaves the store untouched; a successful operation
//! persists its changes, bumps the game's snapshot sequence number once, and
//! returns the ordered events to deliver, ending with a full
//! [`ServerEvent::GameUpdate`] snapshot.
//!
//! The engine is synchronous and single-owner. The session actor drives one
//! engine per game from one task, which is what makes each operation an
//! atomic read-validate-mutate-save-broadcast step.

use log::info;
use rand::seq::IndexedRandom;
use thiserror::Error;

use super::board;
use super::constants::{HALLWAYS, MAX_PLAYERS, MIN_PLAYERS, ROOMS, SUSPECTS, WEAPONS};
use super::deck;
use super::entities::{
    Card, Character, Game, GameId, GameStateView, Location, PendingDisprove, Player, PlayerView,
    Room, Username, Weapon,
};
use crate::net::messages::{Outgoing, ServerEvent};
use crate::store::{GameStore, StoreError};

/// A rejected or failed operation. Validation variants map to `error`
/// frames for the acting client; [`GameError::Store`] wraps lookup and
/// persistence failures.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("you already moved this turn")]
    AlreadyMoved,
    #[error("you are already there")]
    AlreadyThere,
    #[error("that location is not adjacent")]
    NotAdjacent,
    #[error("that hallway is occupied")]
    HallwayOccupied,
    #[error("you must move before suggesting")]
    MustMoveFirst,
    #[error("you must be in a room to suggest")]
    MustBeInRoom,
    #[error("you already made your accusation")]
    AlreadyAccused,
    #[error("you have been eliminated")]
    Eliminated,
    #[error("only the host can start the game")]
    NotHost,
    #[error("not enough players to start")]
    NotEnoughPlayers,
    #[error("the game has already begun")]
    GameAlreadyBegun,
    #[error("the game has not begun")]
    GameNotBegun,
    #[error("the game is over")]
    GameNotActive,
    #[error("you are not connected to the game")]
    PlayerInactive,
    #[error("no characters left to assign")]
    NoCharactersLeft,
    #[error("no suggestion is waiting on a card")]
    NoPendingDisprove,
    #[error("another player must choose the card")]
    NotYourDisprove,
    #[error("that card is not one of the choices")]
    CardNotInChoices,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One game's rule engine over a backing store.
pub struct Engine<S: GameStore> {
    store: S,
    game_id: GameId,
}

impl<S: GameStore> Engine<S> {
    pub fn new(store: S, game_id: GameId) -> Self {
        Self { store, game_id }
    }

    #[must_use]
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    fn game(&self) -> Result<Game, GameError> {
        Ok(self.store.game(self.game_id)?)
    }

    fn player(&self, username: &Username) -> Result<Player, GameError> {
        Ok(self.store.player(self.game_id, username)?)
    }

    fn players(&self) -> Result<Vec<Player>, GameError> {
        Ok(self.store.players(self.game_id)?)
    }

    /// Current full-state snapshot. The case file stays hidden until the
    /// game has ended.
    pub fn snapshot(&self) -> Result<GameStateView, GameError> {
        let game = self.game()?;
        let players = self.players()?;
        Ok(GameStateView {
            game_id: game.id,
            seq: game.seq,
            case_file: if game.is_active { None } else { game.case_file },
            game_is_active: game.is_active,
            begun: game.begun,
            players: players.iter().map(PlayerView::from).collect(),
            rooms: ROOMS.to_vec(),
            hallways: HALLWAYS.to_vec(),
            weapons: WEAPONS.to_vec(),
        })
    }

    /// The username currently holding the turn, if any.
    pub fn current_turn(&self) -> Result<Option<Username>, GameError> {
        Ok(self
            .players()?
            .into_iter()
            .find(|p| p.turn)
            .map(|p| p.username))
    }

    /// Bumps the snapshot sequence number and appends the closing
    /// `game_update` broadcast. Called exactly once per successful
    /// mutating operation, after all other saves.
    fn push_update(&mut self, events: &mut Vec<Outgoing>) -> Result<(), GameError> {
        let mut game = self.game()?;
        game.seq += 1;
        self.store.save_game(&game)?;
        let state = self.snapshot()?;
        events.push(Outgoing::all(ServerEvent::GameUpdate { state }));
        Ok(())
    }

    /// Adds `username` to the game, or reactivates them if they joined
    /// before. New players get a random unused character at its starting
    /// hallway; new joins are rejected once the game has begun.
    pub fn join(&mut self, username: &Username) -> Result<Vec<Outgoing>, GameError> {
        let mut game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }

        let mut events = Vec::new();
        match self.store.player(self.game_id, username) {
            Ok(mut player) => {
                player.is_active = true;
                self.store.save_player(&player)?;
                info!("{} rejoined game {}", username, self.game_id);
                events.push(Outgoing::all(ServerEvent::PlayerJoined {
                    username: username.clone(),
                    character: player.character,
                }));
            }
            Err(StoreError::PlayerNotFound(_)) => {
                if game.begun {
                    return Err(GameError::GameAlreadyBegun);
                }
                if game.players_list.len() >= MAX_PLAYERS {
                    return Err(GameError::NoCharactersLeft);
                }
                let players = self.players()?;
                let available: Vec<Character> = SUSPECTS
                    .into_iter()
                    .filter(|c| players.iter().all(|p| p.character != *c))
                    .collect();
                let character = *available
                    .choose(&mut rand::rng())
                    .ok_or(GameError::NoCharactersLeft)?;
                let player = Player::new(
                    self.game_id,
                    username.clone(),
                    character,
                    board::starting_location(character),
                );
                self.store.create_player(&player)?;
                game.players_list.push(username.clone());
                self.store.save_game(&game)?;
                info!("{} joined game {} as {}", username, self.game_id, character);
                events.push(Outgoing::all(ServerEvent::PlayerJoined {
                    username: username.clone(),
                    character,
                }));
            }
            Err(e) => return Err(e.into()),
        }

        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Marks a departed player inactive. Their token and cards stay in
    /// play and the turn order is unchanged; the turn timeout unsticks the
    /// game if they held the turn.
    pub fn disconnect(&mut self, username: &Username) -> Result<Vec<Outgoing>, GameError> {
        let mut player = self.player(username)?;
        player.is_active = false;
        self.store.save_player(&player)?;
        info!("{} left game {}", username, self.game_id);

        let mut events = vec![Outgoing::all(ServerEvent::PlayerOut {
            username: username.clone(),
        })];
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Starts the game: picks the case file, deals hands, and gives the
    /// first turn to Miss Scarlet's player, or the earliest joiner if no
    /// one picked her. Only the host (first joiner) may start.
    pub fn start_game(&mut self, caller: &Username) -> Result<Vec<Outgoing>, GameError> {
        let mut game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        if game.begun {
            return Err(GameError::GameAlreadyBegun);
        }
        if game.players_list.first() != Some(caller) {
            return Err(GameError::NotHost);
        }
        let players = self.players()?;
        let active: Vec<&Player> = players.iter().filter(|p| p.is_active).collect();
        if active.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        let mut rng = rand::rng();
        let case_file = deck::generate_case_file(&mut rng);

        let starter = active
            .iter()
            .find(|p| p.character == Character::MissScarlet)
            .or_else(|| active.first())
            .map(|p| p.username.clone())
            .ok_or(GameError::NotEnoughPlayers)?;
        let seating: Vec<Character> = active.iter().map(|p| p.character).collect();
        let starting_character = active
            .iter()
            .find(|p| p.username == starter)
            .map(|p| p.character)
            .ok_or(GameError::NotEnoughPlayers)?;
        let mut hands = deck::deal_hands(&case_file, &seating, starting_character, &mut rng);

        for player in &players {
            if !player.is_active {
                continue;
            }
            let mut player = player.clone();
            player.hand = hands.remove(&player.character).unwrap_or_default();
            player.turn = player.username == starter;
            player.moved = false;
            player.suggested = false;
            self.store.save_player(&player)?;
        }

        game.case_file = Some(case_file);
        game.begun = true;
        self.store.save_game(&game)?;
        info!(
            "game {} started by {} with {} players; first turn: {}",
            self.game_id,
            caller,
            active.len(),
            starter
        );

        let mut events = vec![
            Outgoing::all(ServerEvent::GameStarted),
            Outgoing::all(ServerEvent::Popup {
                message: format!("The game has begun. It is {starter}'s turn."),
            }),
        ];
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Moves the caller's token one step. One move per turn, except when a
    /// single non-eliminated player remains; hallways hold one token.
    pub fn move_to(
        &mut self,
        caller: &Username,
        location: Location,
    ) -> Result<Vec<Outgoing>, GameError> {
        let game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        if !game.begun {
            return Err(GameError::GameNotBegun);
        }
        let mut player = self.player(caller)?;
        if !player.is_active {
            return Err(GameError::PlayerInactive);
        }
        if player.accused {
            return Err(GameError::Eliminated);
        }
        if !player.turn {
            return Err(GameError::NotYourTurn);
        }
        let players = self.players()?;
        let survivors = players.iter().filter(|p| !p.accused).count();
        if player.moved && survivors > 1 {
            return Err(GameError::AlreadyMoved);
        }
        if player.location == location {
            return Err(GameError::AlreadyThere);
        }
        if !board::is_adjacent(player.location, location) {
            return Err(GameError::NotAdjacent);
        }
        if location.is_hallway() && players.iter().any(|p| p.location == location) {
            return Err(GameError::HallwayOccupied);
        }

        player.location = location;
        player.moved = true;
        self.store.save_player(&player)?;
        info!("{} moved to {} in game {}", caller, location, self.game_id);

        let mut events = vec![Outgoing::all(ServerEvent::Popup {
            message: format!("{caller} moved to {location}."),
        })];
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Makes a suggestion from the caller's current room, pulling the
    /// suggested suspect's token into it, then scans for a disproof.
    ///
    /// The first holder of a matching card stops the scan: a single match
    /// is revealed privately to the suggester and ends the turn; several
    /// matches record a pending choice and prompt the holder with
    /// `select_card`. With no match anywhere the turn stays open so the
    /// caller may accuse or end their turn.
    pub fn suggest(
        &mut self,
        caller: &Username,
        suspect: Character,
        weapon: Weapon,
        room: Room,
    ) -> Result<Vec<Outgoing>, GameError> {
        let mut game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        if !game.begun {
            return Err(GameError::GameNotBegun);
        }
        let player = self.player(caller)?;
        if !player.is_active {
            return Err(GameError::PlayerInactive);
        }
        if player.accused {
            return Err(GameError::Eliminated);
        }
        if !player.turn {
            return Err(GameError::NotYourTurn);
        }
        if !player.moved && !player.suggested {
            return Err(GameError::MustMoveFirst);
        }
        if !player.location.is_room() {
            return Err(GameError::MustBeInRoom);
        }

        let players = self.players()?;
        let mut events = Vec::new();

        // Pull the suspect's token into the suggestion room.
        if let Some(pulled) = players
            .iter()
            .find(|p| p.character == suspect && p.username != *caller)
        {
            if pulled.location != player.location {
                let mut pulled = pulled.clone();
                pulled.location = player.location;
                pulled.suggested = true;
                self.store.save_player(&pulled)?;
                events.push(Outgoing::all(ServerEvent::Popup {
                    message: format!("{suspect} was moved to {} by the suggestion.", player.location),
                }));
            }
        }

        // Disproof order: the suspect's player first, then the rest in join
        // order starting after the suggester, wrapping. The suggester never
        // disproves their own suggestion.
        let mut candidates: Vec<Username> = Vec::new();
        if let Some(p) = players
            .iter()
            .find(|p| p.character == suspect && p.username != *caller)
        {
            candidates.push(p.username.clone());
        }
        let order = &game.players_list;
        let start = order.iter().position(|u| u == caller).unwrap_or(0);
        for offset in 1..order.len() {
            let username = &order[(start + offset) % order.len()];
            if username != caller && !candidates.contains(username) {
                candidates.push(username.clone());
            }
        }

        let suggestion_cards = [
            Card::Suspect(suspect),
            Card::Weapon(weapon),
            Card::Room(room),
        ];
        let mut disproved_by = None;
        let mut private = Vec::new();
        let mut end_turn_after = false;
        for candidate in candidates {
            let holder = self.player(&candidate)?;
            let matching: Vec<Card> = holder
                .hand
                .iter()
                .filter(|c| suggestion_cards.contains(c))
                .copied()
                .collect();
            if matching.is_empty() {
                continue;
            }
            disproved_by = Some(candidate.clone());
            if let [card] = matching.as_slice() {
                private.push(Outgoing::to(
                    caller.clone(),
                    ServerEvent::Popup {
                        message: format!("{candidate} disproved your suggestion with {card}."),
                    },
                ));
                end_turn_after = true;
            } else {
                game.pending_disprove = Some(PendingDisprove {
                    chooser: candidate.clone(),
                    suggester: caller.clone(),
                    choices: matching.clone(),
                });
                self.store.save_game(&game)?;
                private.push(Outgoing::to(
                    candidate,
                    ServerEvent::SelectCard { choices: matching },
                ));
            }
            break;
        }

        info!(
            "{} suggested {}, {}, {} in game {} (disproved by {:?})",
            caller, suspect, weapon, room, self.game_id, disproved_by
        );
        events.push(Outgoing::all(ServerEvent::SuggestionResult {
            username: caller.clone(),
            suspect,
            weapon,
            room,
            disproved_by: disproved_by.clone(),
        }));
        if disproved_by.is_none() {
            events.push(Outgoing::all(ServerEvent::Popup {
                message: format!("No one could disprove {caller}'s suggestion."),
            }));
        }
        events.extend(private);
        if end_turn_after {
            self.advance_turn(caller, &mut events)?;
        }
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Makes the caller's one accusation. A correct accusation ends the
    /// game; an incorrect one eliminates the caller from further play and
    /// passes the turn on.
    pub fn accuse(
        &mut self,
        caller: &Username,
        suspect: Character,
        weapon: Weapon,
        room: Room,
    ) -> Result<Vec<Outgoing>, GameError> {
        let mut game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        if !game.begun {
            return Err(GameError::GameNotBegun);
        }
        let mut player = self.player(caller)?;
        if !player.is_active {
            return Err(GameError::PlayerInactive);
        }
        if player.accused {
            return Err(GameError::AlreadyAccused);
        }
        if !player.turn {
            return Err(GameError::NotYourTurn);
        }
        let case_file = game.case_file.ok_or(GameError::GameNotBegun)?;

        player.accused = true;
        self.store.save_player(&player)?;
        let correct = case_file.matches(suspect, weapon, room);
        info!(
            "{} accused {}, {}, {} in game {} ({})",
            caller,
            suspect,
            weapon,
            room,
            self.game_id,
            if correct { "correct" } else { "incorrect" }
        );

        let mut events = vec![Outgoing::all(ServerEvent::AccusationResult {
            username: caller.clone(),
            suspect,
            weapon,
            room,
            correct,
        })];
        if correct {
            game.is_active = false;
            game.pending_disprove = None;
            self.store.save_game(&game)?;
            events.push(Outgoing::all(ServerEvent::GameEnd {
                winner: caller.clone(),
                suspect: case_file.suspect,
                weapon: case_file.weapon,
                room: case_file.room,
            }));
        } else {
            events.push(Outgoing::all(ServerEvent::PlayerEliminated {
                username: caller.clone(),
            }));
            self.advance_turn(caller, &mut events)?;
        }
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Ends the caller's turn after they acted (moved, suggested while
    /// pulled into a room, or accused).
    pub fn end_turn(&mut self, caller: &Username) -> Result<Vec<Outgoing>, GameError> {
        let game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        if !game.begun {
            return Err(GameError::GameNotBegun);
        }
        let player = self.player(caller)?;
        if !player.turn {
            return Err(GameError::NotYourTurn);
        }
        if !player.moved && !player.accused && !player.suggested {
            return Err(GameError::MustMoveFirst);
        }

        let mut events = Vec::new();
        self.advance_turn(caller, &mut events)?;
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Resolves a pending multi-card disproof: validates the choice against
    /// what the engine recorded, reveals it to the suggester only, and ends
    /// the suggester's turn.
    pub fn card_selected(
        &mut self,
        caller: &Username,
        card: Card,
    ) -> Result<Vec<Outgoing>, GameError> {
        let mut game = self.game()?;
        if !game.is_active {
            return Err(GameError::GameNotActive);
        }
        let pending = game
            .pending_disprove
            .clone()
            .ok_or(GameError::NoPendingDisprove)?;
        if pending.chooser != *caller {
            return Err(GameError::NotYourDisprove);
        }
        if !pending.choices.contains(&card) {
            return Err(GameError::CardNotInChoices);
        }

        game.pending_disprove = None;
        self.store.save_game(&game)?;
        info!(
            "{} revealed a card to {} in game {}",
            caller, pending.suggester, self.game_id
        );

        let mut events = vec![Outgoing::to(
            pending.suggester.clone(),
            ServerEvent::Popup {
                message: format!("{caller} disproved your suggestion with {card}."),
            },
        )];
        self.advance_turn(&pending.suggester, &mut events)?;
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Forcibly passes the turn on, used when the turn timer expires. A
    /// pending disproof is abandoned along with the turn.
    pub fn force_end_turn(&mut self) -> Result<Vec<Outgoing>, GameError> {
        let game = self.game()?;
        if !game.is_active || !game.begun {
            return Err(GameError::GameNotActive);
        }
        let Some(holder) = self.current_turn()? else {
            return Err(GameError::GameNotActive);
        };
        info!("{} ran out of time in game {}", holder, self.game_id);

        let mut events = vec![Outgoing::all(ServerEvent::Popup {
            message: format!("{holder} ran out of time."),
        })];
        self.advance_turn(&holder, &mut events)?;
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Wipes the game back to a fresh lobby.
    pub fn reset(&mut self) -> Result<Vec<Outgoing>, GameError> {
        self.store.reset_game(self.game_id)?;
        info!("game {} reset", self.game_id);
        let mut events = Vec::new();
        self.push_update(&mut events)?;
        Ok(events)
    }

    /// Clears the current holder's turn flags and hands the turn to the
    /// next non-eliminated player in join order. No remaining players is a
    /// tie; a single survivor keeps the turn and may move again.
    fn advance_turn(
        &mut self,
        current: &Username,
        events: &mut Vec<Outgoing>,
    ) -> Result<(), GameError> {
        let mut game = self.game()?;
        // A disproof prompt dies with its suggester's turn; a stale one
        // must never hand out a second turn later.
        if game
            .pending_disprove
            .as_ref()
            .is_some_and(|pending| pending.suggester == *current)
        {
            game.pending_disprove = None;
            self.store.save_game(&game)?;
        }
        let mut holder = self.player(current)?;
        holder.turn = false;
        holder.moved = false;
        holder.suggested = false;
        self.store.save_player(&holder)?;

        let players = self.players()?;
        let survivors: Vec<&Player> = players.iter().filter(|p| !p.accused).collect();
        if survivors.is_empty() {
            let case_file = game.case_file.ok_or(GameError::GameNotBegun)?;
            game.is_active = false;
            game.pending_disprove = None;
            self.store.save_game(&game)?;
            info!("game {} ended in a tie", self.game_id);
            events.push(Outgoing::all(ServerEvent::GameTie {
                suspect: case_file.suspect,
                weapon: case_file.weapon,
                room: case_file.room,
            }));
            return Ok(());
        }

        let next = if let [survivor] = survivors.as_slice() {
            survivor.username.clone()
        } else {
            let order = &game.players_list;
            let start = order.iter().position(|u| u == current).unwrap_or(0);
            let mut chosen = None;
            for offset in 1..=order.len() {
                let candidate = &order[(start + offset) % order.len()];
                let eliminated = players
                    .iter()
                    .find(|p| &p.username == candidate)
                    .is_none_or(|p| p.accused);
                if !eliminated {
                    chosen = Some(candidate.clone());
                    break;
                }
            }
            chosen.ok_or(GameError::GameNotActive)?
        };

        let mut next_player = self.player(&next)?;
        next_player.turn = true;
        next_player.moved = false;
        self.store.save_player(&next_player)?;
        events.push(Outgoing::all(ServerEvent::Popup {
            message: format!("It is {next}'s turn."),
        }));
        Ok(())
    }
}
