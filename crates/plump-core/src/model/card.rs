use core::fmt;
use serde::{Deserialize, Serialize};

pub const SUIT_COUNT: u8 = 4;
pub const VALUE_COUNT: u8 = 13;

/// A playing card identified by integer codes only.
///
/// `suit` is in `0..4` and `value` in `0..13` (0 is the lowest rank). Display symbols
/// are a presentation concern and live with the transports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Card {
    pub suit: u8,
    pub value: u8,
}

impl Card {
    pub const fn new(suit: u8, value: u8) -> Option<Self> {
        if suit < SUIT_COUNT && value < VALUE_COUNT {
            Some(Self { suit, value })
        } else {
            None
        }
    }

    pub const fn same_suit(self, other: Card) -> bool {
        self.suit == other.suit
    }

    /// Rank comparison within a suit; `None` when the suits differ.
    pub fn beats(self, other: Card) -> Option<bool> {
        self.same_suit(other).then_some(self.value > other.value)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.suit, self.value)
    }
}
