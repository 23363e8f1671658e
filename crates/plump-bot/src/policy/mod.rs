mod heuristic;

pub use heuristic::HeuristicPolicy;

use plump_core::game::GameState;
use plump_core::model::hand::Hand;
use plump_core::model::player::Seat;
use plump_core::model::trick::Trick;

/// What an automated seat sees when asked for a guess.
pub struct GuessContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub prior_guesses: &'a [usize],
    pub seat_count: usize,
}

impl<'a> GuessContext<'a> {
    pub fn from_state(state: &'a GameState, seat: Seat) -> Self {
        Self {
            seat,
            hand: state.hand(seat),
            prior_guesses: state.prior_guesses(),
            seat_count: state.seat_count(),
        }
    }
}

/// What an automated seat sees when asked to play.
pub struct PlayContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub trick: &'a Trick,
    pub playable: Vec<usize>,
}

impl<'a> PlayContext<'a> {
    pub fn from_state(state: &'a GameState, seat: Seat) -> Self {
        Self {
            seat,
            hand: state.hand(seat),
            trick: state.trick(),
            playable: state.playable(seat),
        }
    }
}

/// Decision source for a seat without a human behind it.
pub trait Policy: Send {
    fn choose_guess(&mut self, ctx: &GuessContext) -> usize;

    /// Index into `ctx.hand`; must be one of `ctx.playable`.
    fn choose_play(&mut self, ctx: &PlayContext) -> usize;
}
