use crate::model::card::Card;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerName(pub String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seat as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: PlayerName,
    pub human: bool,
    pub hand: Vec<Card>,
}

impl Player {
    /// The same player with the hand withheld, for messages seen by every seat.
    pub fn public_view(&self) -> Self {
        Self {
            name: self.name.clone(),
            human: self.human,
            hand: Vec::new(),
        }
    }
}

/// Fixed position at the table, `0..seat_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(pub usize);

impl Seat {
    pub const fn index(self) -> usize {
        self.0
    }

    pub const fn offset(self, steps: usize, seat_count: usize) -> Seat {
        Seat((self.0 + steps) % seat_count)
    }

    pub const fn next(self, seat_count: usize) -> Seat {
        self.offset(1, seat_count)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// Seats in rotation order starting at `first`.
pub fn rotation(first: Seat, seat_count: usize) -> impl Iterator<Item = Seat> {
    (0..seat_count).map(move |step| first.offset(step, seat_count))
}
