use crate::model::deck::DECK_SIZE;
use std::fmt;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 4;
/// Largest hand size when none is configured; fits every supported table.
pub const DEFAULT_ROUNDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    ZeroRounds,
    NotEnoughCards { rounds: usize, seat_count: usize },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::ZeroRounds => write!(f, "at least one round is required"),
            ScheduleError::NotEnoughCards { rounds, seat_count } => write!(
                f,
                "{rounds} cards for each of {seat_count} seats exceeds the {DECK_SIZE}-card deck"
            ),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Hand sizes for every round: down from `N` to 1, one single-card round per seat, and
/// back up to `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSchedule {
    sizes: Vec<usize>,
}

impl RoundSchedule {
    pub fn new(rounds: usize, seat_count: usize) -> Result<Self, ScheduleError> {
        if rounds == 0 {
            return Err(ScheduleError::ZeroRounds);
        }
        if rounds * seat_count > DECK_SIZE {
            return Err(ScheduleError::NotEnoughCards { rounds, seat_count });
        }

        let down = (1..=rounds).rev();
        let singles = (1..seat_count).map(|_| 1);
        let up = 2..=rounds;
        Ok(Self {
            sizes: down.chain(singles).chain(up).collect(),
        })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn hand_size(&self, round: usize) -> Option<usize> {
        self.sizes.get(round).copied()
    }
}
