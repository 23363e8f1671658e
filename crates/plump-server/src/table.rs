use crate::transport::Transport;
use plump_bot::{GuessContext, PlayContext, Policy};
use plump_core::game::{GameError, GameState, Phase, PlayOutcome, SeatConfig};
use plump_core::model::guess::is_valid_guess;
use plump_core::model::hand::Hand;
use plump_core::model::player::{PlayerName, Seat};
use plump_core::model::score::StatePerPlayer;
use plump_core::model::trick::legal_restriction;
use plump_core::protocol::Message;
use rand::rngs::StdRng;
use std::io;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot seat the table: {0}")]
    Setup(#[source] GameError),
    #[error("game rule violated: {0}")]
    Rules(#[from] GameError),
    #[error("{name} ({seat}) disconnected: {source}")]
    SeatDisconnected {
        seat: Seat,
        name: PlayerName,
        #[source]
        source: io::Error,
    },
    #[error("{name} ({seat}) sent {attempts} invalid replies in a row")]
    TooManyInvalidReplies {
        seat: Seat,
        name: PlayerName,
        attempts: u32,
    },
}

enum Controller {
    Human(Box<dyn Transport>),
    Automated {
        policy: Box<dyn Policy>,
        observer: Option<Box<dyn Transport>>,
    },
}

/// Who decides for a seat and where its messages go.
pub struct SeatController {
    name: PlayerName,
    controller: Controller,
}

impl SeatController {
    pub fn human(name: PlayerName, transport: Box<dyn Transport>) -> Self {
        Self {
            name,
            controller: Controller::Human(transport),
        }
    }

    pub fn automated(name: PlayerName, policy: Box<dyn Policy>) -> Self {
        Self {
            name,
            controller: Controller::Automated {
                policy,
                observer: None,
            },
        }
    }

    /// An automated seat whose messages are also shown on `observer`.
    pub fn observed(
        name: PlayerName,
        policy: Box<dyn Policy>,
        observer: Box<dyn Transport>,
    ) -> Self {
        Self {
            name,
            controller: Controller::Automated {
                policy,
                observer: Some(observer),
            },
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human(_))
    }

    fn transport_mut(&mut self) -> Option<&mut Box<dyn Transport>> {
        match &mut self.controller {
            Controller::Human(transport) => Some(transport),
            Controller::Automated { observer, .. } => observer.as_mut(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub rounds: Option<usize>,
    /// Consecutive invalid replies tolerated from one seat; unlimited when `None`.
    pub max_invalid_replies: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub winners: Vec<PlayerName>,
    /// Final scores in seat order.
    pub scores: Vec<(PlayerName, usize)>,
    pub rounds_played: usize,
}

enum ReplyError {
    Io(io::Error),
    Exhausted(u32),
}

/// Prompts until `accept` takes a reply or the invalid-reply budget runs out.
fn prompt_until<T>(
    transport: &mut dyn Transport,
    prompt: &Message,
    limit: Option<u32>,
    mut accept: impl FnMut(&str) -> Option<T>,
) -> Result<T, ReplyError> {
    let mut invalid = 0;
    loop {
        let reply = transport.prompt(prompt).map_err(ReplyError::Io)?;
        if let Some(value) = accept(&reply) {
            return Ok(value);
        }
        invalid += 1;
        event!(
            target: "plump_server::table",
            Level::DEBUG,
            peer = %transport.describe(),
            reply = %reply,
            invalid,
            "reply rejected"
        );
        if limit.is_some_and(|limit| invalid >= limit) {
            return Err(ReplyError::Exhausted(invalid));
        }
    }
}

/// Scores after the round with the guesses and wins that produced them.
fn round_result(played: &GameState, scored: &GameState) -> StatePerPlayer {
    played
        .seats()
        .map(|seat| {
            let mut state = played.public_state(seat);
            state.score = scored.public_state(seat).score;
            (played.name(seat).clone(), state)
        })
        .collect()
}

/// Runs one game from the first deal to the final `GameOver`.
pub struct Table {
    state: GameState,
    seats: Vec<SeatController>,
    rng: StdRng,
    options: TableOptions,
}

impl Table {
    pub fn new(
        seats: Vec<SeatController>,
        options: TableOptions,
        rng: StdRng,
    ) -> Result<Self, TableError> {
        let configs = seats
            .iter()
            .map(|seat| SeatConfig {
                name: seat.name.clone(),
                human: seat.is_human(),
            })
            .collect();
        let state = GameState::new(configs, options.rounds).map_err(TableError::Setup)?;
        Ok(Self {
            state,
            seats,
            rng,
            options,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(mut self) -> Result<GameSummary, TableError> {
        event!(
            target: "plump_server::table",
            Level::INFO,
            seats = self.state.seat_count(),
            rounds = self.state.schedule().len(),
            "game started"
        );

        while self.state.phase() != Phase::Finished {
            self.play_round()?;
        }

        let winner_indices = self.state.winners().unwrap_or_default();
        let players = self
            .state
            .players()
            .iter()
            .map(|player| player.public_view())
            .collect();
        self.broadcast(&Message::Winners {
            players,
            winner_indices: winner_indices.clone(),
        })?;
        self.broadcast(&Message::GameOver)?;

        let summary = GameSummary {
            winners: winner_indices
                .iter()
                .map(|index| self.state.name(Seat(*index)).clone())
                .collect(),
            scores: self
                .state
                .seats()
                .map(|seat| {
                    (
                        self.state.name(seat).clone(),
                        self.state.public_state(seat).score,
                    )
                })
                .collect(),
            rounds_played: self.state.round_index(),
        };
        event!(
            target: "plump_server::table",
            Level::INFO,
            winners = ?summary.winners,
            "game over"
        );
        Ok(summary)
    }

    fn play_round(&mut self) -> Result<(), TableError> {
        self.state = self.state.deal(&mut self.rng)?;
        event!(
            target: "plump_server::table",
            Level::INFO,
            round = self.state.round_number(),
            hand_size = self.state.hand_size(),
            "round dealt"
        );

        while let Some(seat) = self.state.bidder() {
            self.announce_turn(seat)?;
            let guess = self.collect_guess(seat)?;
            self.state = self.state.submit_guess(seat, guess)?;
            event!(
                target: "plump_server::table",
                Level::DEBUG,
                seat = seat.index(),
                guess,
                "guess accepted"
            );
        }
        let guesses = Message::Guesses {
            state: self.state.state_per_player(),
        };
        self.broadcast(&guesses)?;

        while let Some(seat) = self.state.player_to_act() {
            self.announce_turn(seat)?;
            let index = self.collect_play(seat)?;
            let (next, outcome) = self.state.play_card(seat, index)?;
            self.state = next;
            match outcome {
                PlayOutcome::Played { .. } => {
                    let trick = Message::Trick(self.state.trick().clone());
                    self.broadcast(&trick)?;
                }
                PlayOutcome::TrickCompleted { winner, trick, .. } => {
                    event!(
                        target: "plump_server::table",
                        Level::DEBUG,
                        winner = winner.index(),
                        "trick taken"
                    );
                    self.broadcast(&Message::Trick(trick))?;
                    let board = Message::Scoreboard {
                        state: self.state.state_per_player(),
                    };
                    self.broadcast(&board)?;
                    let winner = Message::Winner(self.state.player(winner).public_view());
                    self.broadcast(&winner)?;
                }
            }
        }

        let scored = self.state.finish_round()?;
        let board = Message::Scoreboard {
            state: round_result(&self.state, &scored),
        };
        self.state = scored;
        self.broadcast(&board)
    }

    fn announce_turn(&mut self, seat: Seat) -> Result<(), TableError> {
        let turn = Message::Turn {
            whose: self.state.player(seat).public_view(),
        };
        self.broadcast(&turn)
    }

    fn collect_guess(&mut self, seat: Seat) -> Result<usize, TableError> {
        let limit = self.options.max_invalid_replies;
        let state = &self.state;
        let reply = match &mut self.seats[seat.index()].controller {
            Controller::Automated { policy, .. } => {
                return Ok(policy.choose_guess(&GuessContext::from_state(state, seat)));
            }
            Controller::Human(transport) => {
                let context = Message::RequestGuessContext {
                    player: state.player(seat),
                    hand: state.hand(seat).to_vec(),
                    guesses: state.prior_guesses().to_vec(),
                    players: state.seat_count(),
                };
                transport
                    .send(&context)
                    .map_err(ReplyError::Io)
                    .and_then(|()| {
                        prompt_until(&mut **transport, &Message::RequestGuess, limit, |reply| {
                            reply.parse::<usize>().ok().filter(|guess| {
                                is_valid_guess(
                                    state.hand_size(),
                                    state.prior_guesses(),
                                    state.seat_count(),
                                    *guess,
                                )
                            })
                        })
                    })
            }
        };
        reply.map_err(|err| self.reply_failed(seat, err))
    }

    fn collect_play(&mut self, seat: Seat) -> Result<usize, TableError> {
        let limit = self.options.max_invalid_replies;
        let state = &self.state;
        let reply = match &mut self.seats[seat.index()].controller {
            Controller::Automated { policy, .. } => {
                return Ok(policy.choose_play(&PlayContext::from_state(state, seat)));
            }
            Controller::Human(transport) => {
                let hand: &Hand = state.hand(seat);
                let playable = state.playable(seat);
                let player = state.player(seat);
                let context = Message::PlayRequestContext {
                    player: player.clone(),
                    hand: hand.to_vec(),
                    trick: state.trick().clone(),
                    valid_cards: legal_restriction(hand, state.trick()),
                };
                let prompt = Message::PlayRequest(player);
                transport
                    .send(&context)
                    .map_err(ReplyError::Io)
                    .and_then(|()| {
                        prompt_until(&mut **transport, &prompt, limit, |reply| {
                            reply
                                .parse::<usize>()
                                .ok()
                                .filter(|index| playable.contains(index))
                        })
                    })
            }
        };
        reply.map_err(|err| self.reply_failed(seat, err))
    }

    fn reply_failed(&self, seat: Seat, err: ReplyError) -> TableError {
        let name = self.state.name(seat).clone();
        match err {
            ReplyError::Io(source) => {
                event!(
                    target: "plump_server::table",
                    Level::WARN,
                    seat = seat.index(),
                    name = %name,
                    error = %source,
                    "seat disconnected"
                );
                TableError::SeatDisconnected { seat, name, source }
            }
            ReplyError::Exhausted(attempts) => {
                TableError::TooManyInvalidReplies { seat, name, attempts }
            }
        }
    }

    fn broadcast(&mut self, message: &Message) -> Result<(), TableError> {
        for index in 0..self.seats.len() {
            let sent = match self.seats[index].transport_mut() {
                Some(transport) => transport.send(message),
                None => Ok(()),
            };
            if let Err(source) = sent {
                return Err(self.reply_failed(Seat(index), ReplyError::Io(source)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SeatController, Table, TableError, TableOptions};
    use crate::transport::Transport;
    use plump_bot::HeuristicPolicy;
    use plump_core::model::player::PlayerName;
    use plump_core::protocol::Message;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<Message>>>;

    /// Answers prompts with a bad reply first, then counts up from zero until one is
    /// accepted. Every message received is recorded in `log`.
    struct Scripted {
        log: Log,
        next: Option<usize>,
    }

    impl Scripted {
        fn new(log: Log) -> Self {
            Self { log, next: None }
        }
    }

    impl Transport for Scripted {
        fn send(&mut self, message: &Message) -> io::Result<()> {
            if matches!(
                message,
                Message::RequestGuessContext { .. } | Message::PlayRequestContext { .. }
            ) {
                self.next = None;
            }
            self.log.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn read_line(&mut self) -> io::Result<String> {
            let reply = match self.next {
                None => "not a number".to_string(),
                Some(value) => value.to_string(),
            };
            self.next = Some(self.next.map_or(0, |value| value + 1));
            Ok(reply)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    struct Stubborn;

    impl Transport for Stubborn {
        fn send(&mut self, _: &Message) -> io::Result<()> {
            Ok(())
        }

        fn read_line(&mut self) -> io::Result<String> {
            Ok("never".to_string())
        }

        fn describe(&self) -> String {
            "stubborn".to_string()
        }
    }

    struct Hangup;

    impl Transport for Hangup {
        fn send(&mut self, message: &Message) -> io::Result<()> {
            if message.is_prompt() {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            } else {
                Ok(())
            }
        }

        fn read_line(&mut self) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "gone"))
        }

        fn describe(&self) -> String {
            "hangup".to_string()
        }
    }

    fn bot(name: &str, seed: u64) -> SeatController {
        SeatController::automated(PlayerName::new(name), Box::new(HeuristicPolicy::seeded(seed)))
    }

    fn options(rounds: usize) -> TableOptions {
        TableOptions {
            rounds: Some(rounds),
            max_invalid_replies: None,
        }
    }

    #[test]
    fn robots_finish_a_seeded_game() {
        let seats = (0..4).map(|i| bot(&format!("bot{i}"), i)).collect();
        let table = Table::new(seats, options(2), StdRng::seed_from_u64(9)).unwrap();
        let summary = table.run().unwrap();

        assert_eq!(summary.rounds_played, 6);
        assert!(!summary.winners.is_empty());
        let best = summary.scores.iter().map(|(_, score)| *score).max().unwrap();
        for winner in &summary.winners {
            let (_, score) = summary.scores.iter().find(|(name, _)| name == winner).unwrap();
            assert_eq!(*score, best);
        }
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let run = || {
            let seats = vec![bot("a", 1), bot("b", 2), bot("c", 3)];
            Table::new(seats, options(3), StdRng::seed_from_u64(77))
                .unwrap()
                .run()
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn human_seat_is_reprompted_and_sees_the_whole_game() {
        let log = Log::default();
        let seats = vec![
            SeatController::human(PlayerName::new("ada"), Box::new(Scripted::new(log.clone()))),
            bot("bot", 5),
        ];
        let summary = Table::new(seats, options(2), StdRng::seed_from_u64(3))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.rounds_played, 4);

        let log = log.lock().unwrap();
        assert!(matches!(log.first(), Some(Message::Turn { .. })));
        assert!(matches!(log[log.len() - 2], Message::Winners { .. }));
        assert_eq!(log.last(), Some(&Message::GameOver));

        let contexts = log
            .iter()
            .filter(|m| matches!(m, Message::RequestGuessContext { .. }))
            .count();
        let prompts = log
            .iter()
            .filter(|m| matches!(m, Message::RequestGuess))
            .count();
        assert_eq!(contexts, 4);
        assert!(prompts >= 2 * contexts);

        for message in log.iter() {
            match message {
                Message::Turn { whose } | Message::Winner(whose) => {
                    assert!(whose.hand.is_empty())
                }
                Message::Winners { players, .. } => {
                    assert!(players.iter().all(|p| p.hand.is_empty()))
                }
                _ => {}
            }
        }
    }

    #[test]
    fn broadcasts_follow_the_round_order() {
        let log = Log::default();
        let seats = vec![
            bot("a", 1),
            SeatController::observed(
                PlayerName::new("watched"),
                Box::new(HeuristicPolicy::seeded(2)),
                Box::new(Scripted::new(log.clone())),
            ),
        ];
        Table::new(seats, options(1), StdRng::seed_from_u64(4))
            .unwrap()
            .run()
            .unwrap();

        let names: Vec<&str> = log.lock().unwrap().iter().map(Message::name).collect();
        let round = [
            "Turn", "Turn", "Guesses", "Turn", "Trick", "Turn", "Trick", "Scoreboard", "Winner",
            "Scoreboard",
        ];
        let mut expected: Vec<&str> = round.iter().chain(round.iter()).copied().collect();
        expected.extend(["Winners", "GameOver"]);
        assert_eq!(names, expected);
    }

    #[test]
    fn invalid_reply_budget_aborts_the_game() {
        let seats = vec![
            SeatController::human(PlayerName::new("ada"), Box::new(Stubborn)),
            bot("bot", 1),
        ];
        let options = TableOptions {
            rounds: Some(1),
            max_invalid_replies: Some(3),
        };
        let err = Table::new(seats, options, StdRng::seed_from_u64(1))
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, TableError::TooManyInvalidReplies { attempts: 3, .. }));
    }

    #[test]
    fn disconnect_names_the_seat() {
        let seats = vec![
            bot("bot", 1),
            SeatController::human(PlayerName::new("gone"), Box::new(Hangup)),
        ];
        let err = Table::new(seats, options(1), StdRng::seed_from_u64(1))
            .unwrap()
            .run()
            .unwrap_err();
        match err {
            TableError::SeatDisconnected { seat, name, .. } => {
                assert_eq!(seat.index(), 1);
                assert_eq!(name.as_str(), "gone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_fail_setup() {
        let seats = vec![bot("same", 1), bot("same", 2)];
        let err = Table::new(seats, options(1), StdRng::seed_from_u64(1))
            .err()
            .unwrap();
        assert!(matches!(err, TableError::Setup(_)));
    }
}
