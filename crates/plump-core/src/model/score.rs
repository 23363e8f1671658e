use crate::model::player::PlayerName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_HIT_BONUS: usize = 10;
pub const BONUS_PER_TRICK: usize = 10;

/// Public state keyed by seat name, ordered by name.
pub type StatePerPlayer = BTreeMap<PlayerName, PublicState>;

/// The part of a seat's state every other seat may see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub guess: Option<usize>,
    pub wins: usize,
    pub score: usize,
}

impl PublicState {
    pub const fn new() -> Self {
        Self {
            guess: None,
            wins: 0,
            score: 0,
        }
    }

    pub fn hit(&self) -> bool {
        self.guess == Some(self.wins)
    }

    pub fn with_guess(self, guess: usize) -> Self {
        Self {
            guess: Some(guess),
            ..self
        }
    }

    pub fn with_win(self) -> Self {
        Self {
            wins: self.wins + 1,
            ..self
        }
    }
}

/// Additive: a hit adds `max(10, 10 * guess)`, a miss adds nothing. Wins always reset.
pub fn score_round(state: PublicState) -> PublicState {
    let bonus = match state.guess {
        Some(guess) if guess == state.wins => (BONUS_PER_TRICK * guess).max(MIN_HIT_BONUS),
        _ => 0,
    };

    PublicState {
        guess: state.guess,
        wins: 0,
        score: state.score + bonus,
    }
}

/// Every index sharing the highest score. Empty only for an empty table.
pub fn determine_total_winners(states: &[PublicState]) -> Vec<usize> {
    let Some(highest) = states.iter().map(|state| state.score).max() else {
        return Vec::new();
    };
    states
        .iter()
        .enumerate()
        .filter_map(|(index, state)| (state.score == highest).then_some(index))
        .collect()
}
