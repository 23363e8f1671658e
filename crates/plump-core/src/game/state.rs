use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, DealError, Deck};
use crate::model::guess::{GuessError, determine_start_player, validate_guess};
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerName, Seat, rotation};
use crate::model::schedule::{
    DEFAULT_ROUNDS, MAX_SEATS, MIN_SEATS, RoundSchedule, ScheduleError,
};
use crate::model::score::{PublicState, StatePerPlayer, determine_total_winners, score_round};
use crate::model::trick::{Trick, determine_winner, playable_indices};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatConfig {
    pub name: PlayerName,
    pub human: bool,
}

impl SeatConfig {
    pub fn new(name: impl Into<String>, human: bool) -> Self {
        Self {
            name: PlayerName::new(name),
            human,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Dealing,
    Bidding,
    Playing,
    Scoring,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Played {
        card: Card,
    },
    TrickCompleted {
        card: Card,
        winner: Seat,
        trick: Trick,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidSeatCount(usize),
    EmptyName(Seat),
    DuplicateName(PlayerName),
    Schedule(ScheduleError),
    WrongPhase { expected: Phase, actual: Phase },
    OutOfTurn { expected: Seat, actual: Seat },
    Guess(GuessError),
    IndexOutOfRange { index: usize, hand_size: usize },
    MustFollowSuit { suit: u8 },
    Deal(DealError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidSeatCount(count) => write!(
                f,
                "{count} seats requested; a table needs {MIN_SEATS} to {MAX_SEATS}"
            ),
            GameError::EmptyName(seat) => write!(f, "{seat} has an empty name"),
            GameError::DuplicateName(name) => write!(f, "name '{name}' is used twice"),
            GameError::Schedule(err) => write!(f, "{err}"),
            GameError::WrongPhase { expected, actual } => {
                write!(f, "expected phase {expected:?} but game is in {actual:?}")
            }
            GameError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to act but got {actual}")
            }
            GameError::Guess(err) => write!(f, "{err}"),
            GameError::IndexOutOfRange { index, hand_size } => {
                write!(f, "card index {index} is outside a hand of {hand_size}")
            }
            GameError::MustFollowSuit { suit } => write!(f, "must follow suit {suit}"),
            GameError::Deal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<GuessError> for GameError {
    fn from(err: GuessError) -> Self {
        GameError::Guess(err)
    }
}

impl From<DealError> for GameError {
    fn from(err: DealError) -> Self {
        GameError::Deal(err)
    }
}

impl From<ScheduleError> for GameError {
    fn from(err: ScheduleError) -> Self {
        GameError::Schedule(err)
    }
}

/// Authoritative snapshot of a whole game.
///
/// Transitions borrow the current snapshot and hand back the next one, so a rejected
/// input leaves the caller holding the unchanged state.
#[derive(Debug, Clone)]
pub struct GameState {
    seats: Vec<SeatConfig>,
    hands: Vec<Hand>,
    public: Vec<PublicState>,
    schedule: RoundSchedule,
    round: usize,
    rotation: Seat,
    lead: Seat,
    phase: Phase,
    deck: Deck,
    trick: Trick,
    guesses: Vec<usize>,
    played: usize,
}

impl GameState {
    pub fn new(seats: Vec<SeatConfig>, rounds: Option<usize>) -> Result<Self, GameError> {
        let seat_count = seats.len();
        if !(MIN_SEATS..=MAX_SEATS).contains(&seat_count) {
            return Err(GameError::InvalidSeatCount(seat_count));
        }

        let mut seen = HashSet::new();
        for (index, seat) in seats.iter().enumerate() {
            if seat.name.as_str().trim().is_empty() {
                return Err(GameError::EmptyName(Seat(index)));
            }
            if !seen.insert(seat.name.clone()) {
                return Err(GameError::DuplicateName(seat.name.clone()));
            }
        }

        let rounds = rounds.unwrap_or(DEFAULT_ROUNDS);
        let schedule = RoundSchedule::new(rounds, seat_count)?;

        Ok(Self {
            hands: vec![Hand::new(); seat_count],
            public: vec![PublicState::new(); seat_count],
            seats,
            schedule,
            round: 0,
            rotation: Seat(0),
            lead: Seat(0),
            phase: Phase::Dealing,
            deck: Deck::standard(),
            trick: Trick::new(),
            guesses: Vec::new(),
            played: 0,
        })
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> impl Iterator<Item = Seat> {
        (0..self.seat_count()).map(Seat)
    }

    pub fn seat_config(&self, seat: Seat) -> &SeatConfig {
        &self.seats[seat.index()]
    }

    pub fn name(&self, seat: Seat) -> &PlayerName {
        &self.seats[seat.index()].name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn schedule(&self) -> &RoundSchedule {
        &self.schedule
    }

    /// Zero-based index of the active round within the schedule.
    pub fn round_index(&self) -> usize {
        self.round
    }

    /// One-based round number as shown to players.
    pub fn round_number(&self) -> usize {
        self.round + 1
    }

    pub fn hand_size(&self) -> usize {
        self.schedule.hand_size(self.round).unwrap_or(0)
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    pub fn public_state(&self, seat: Seat) -> PublicState {
        self.public[seat.index()]
    }

    pub fn public_states(&self) -> &[PublicState] {
        &self.public
    }

    pub fn state_per_player(&self) -> StatePerPlayer {
        self.seats
            .iter()
            .zip(&self.public)
            .map(|(seat, state)| (seat.name.clone(), *state))
            .collect()
    }

    pub fn player(&self, seat: Seat) -> Player {
        let config = self.seat_config(seat);
        Player {
            name: config.name.clone(),
            human: config.human,
            hand: self.hand(seat).to_vec(),
        }
    }

    pub fn players(&self) -> Vec<Player> {
        self.seats().map(|seat| self.player(seat)).collect()
    }

    /// Guesses made so far this round, in bidding order.
    pub fn prior_guesses(&self) -> &[usize] {
        &self.guesses
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn cards_played(&self) -> usize {
        self.played
    }

    /// Cards in hands, in the deck and already played; 52 throughout a dealt round.
    pub fn cards_accounted(&self) -> usize {
        self.hands.iter().map(Hand::len).sum::<usize>() + self.deck.len() + self.played
    }

    /// Seats in the order they act in the current phase.
    pub fn turn_order(&self) -> Vec<Seat> {
        let first = match self.phase {
            Phase::Playing => self.lead,
            _ => self.rotation,
        };
        rotation(first, self.seat_count()).collect()
    }

    pub fn bidder(&self) -> Option<Seat> {
        (self.phase == Phase::Bidding)
            .then(|| self.rotation.offset(self.guesses.len(), self.seat_count()))
    }

    pub fn player_to_act(&self) -> Option<Seat> {
        (self.phase == Phase::Playing)
            .then(|| self.lead.offset(self.trick.len(), self.seat_count()))
    }

    pub fn playable(&self, seat: Seat) -> Vec<usize> {
        playable_indices(self.hand(seat), &self.trick)
    }

    pub fn winners(&self) -> Option<Vec<usize>> {
        (self.phase == Phase::Finished).then(|| determine_total_winners(&self.public))
    }

    pub fn deal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self, GameError> {
        self.expect_phase(Phase::Dealing)?;

        let size = self.hand_size();
        let mut next = self.clone();
        let mut deck = Deck::standard();
        for seat in rotation(self.rotation, self.seat_count()) {
            let (rest, hand) = deck.draw_hand(size, rng)?;
            deck = rest;
            next.hands[seat.index()] = hand;
        }

        next.deck = deck;
        next.trick = Trick::new();
        next.guesses.clear();
        next.played = 0;
        next.public = self
            .public
            .iter()
            .map(|state| PublicState {
                guess: None,
                ..*state
            })
            .collect();
        next.phase = Phase::Bidding;
        debug_assert_eq!(next.cards_accounted(), DECK_SIZE);
        Ok(next)
    }

    pub fn submit_guess(&self, seat: Seat, guess: usize) -> Result<Self, GameError> {
        self.expect_phase(Phase::Bidding)?;
        let expected = self
            .bidder()
            .ok_or(GameError::WrongPhase {
                expected: Phase::Bidding,
                actual: self.phase,
            })?;
        if seat != expected {
            return Err(GameError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        validate_guess(self.hand_size(), &self.guesses, self.seat_count(), guess)?;

        let mut next = self.clone();
        next.public[seat.index()] = self.public[seat.index()].with_guess(guess);
        next.guesses.push(guess);

        if next.guesses.len() == self.seat_count() {
            let start = determine_start_player(&next.guesses);
            next.lead = self.rotation.offset(start, self.seat_count());
            next.phase = Phase::Playing;
        }
        Ok(next)
    }

    pub fn play_card(&self, seat: Seat, index: usize) -> Result<(Self, PlayOutcome), GameError> {
        self.expect_phase(Phase::Playing)?;
        let expected = self
            .player_to_act()
            .ok_or(GameError::WrongPhase {
                expected: Phase::Playing,
                actual: self.phase,
            })?;
        if seat != expected {
            return Err(GameError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        let hand = self.hand(seat);
        let Some((card, rest)) = hand.without(index) else {
            return Err(GameError::IndexOutOfRange {
                index,
                hand_size: hand.len(),
            });
        };
        if !self.playable(seat).contains(&index) {
            let suit = self.trick.lead_suit().unwrap_or(card.suit);
            return Err(GameError::MustFollowSuit { suit });
        }

        let mut next = self.clone();
        next.hands[seat.index()] = rest;
        next.trick = self.trick.with_card(card);
        next.played += 1;

        if next.trick.len() < self.seat_count() {
            return Ok((next, PlayOutcome::Played { card }));
        }

        let position = determine_winner(&next.trick).unwrap_or(0);
        let winner = self.lead.offset(position, self.seat_count());
        next.public[winner.index()] = next.public[winner.index()].with_win();
        next.lead = winner;
        let trick = std::mem::take(&mut next.trick);

        if next.hands.iter().all(Hand::is_empty) {
            next.phase = Phase::Scoring;
        }

        Ok((
            next,
            PlayOutcome::TrickCompleted {
                card,
                winner,
                trick,
            },
        ))
    }

    pub fn finish_round(&self) -> Result<Self, GameError> {
        self.expect_phase(Phase::Scoring)?;

        let mut next = self.clone();
        next.public = self.public.iter().copied().map(score_round).collect();
        next.rotation = self.rotation.next(self.seat_count());
        next.round = self.round + 1;
        next.phase = if next.round < self.schedule.len() {
            Phase::Dealing
        } else {
            Phase::Finished
        };
        Ok(next)
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}
