use crate::model::card::{Card, SUIT_COUNT, VALUE_COUNT};
use crate::model::hand::Hand;
use rand::Rng;
use rand::seq::index;
use std::fmt;

pub const DECK_SIZE: usize = SUIT_COUNT as usize * VALUE_COUNT as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealError {
    InsufficientCards { requested: usize, remaining: usize },
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::InsufficientCards {
                requested,
                remaining,
            } => write!(
                f,
                "cannot draw {requested} cards from a deck of {remaining}"
            ),
        }
    }
}

impl std::error::Error for DealError {}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in 0..SUIT_COUNT {
            for value in 0..VALUE_COUNT {
                cards.push(Card { suit, value });
            }
        }
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Draws a uniformly random subset of `count` cards without replacement.
    ///
    /// The receiver is left untouched; the remaining deck and the drawn hand are returned.
    pub fn draw_hand<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<(Deck, Hand), DealError> {
        if count > self.cards.len() {
            return Err(DealError::InsufficientCards {
                requested: count,
                remaining: self.cards.len(),
            });
        }

        let mut picked = vec![false; self.cards.len()];
        for position in index::sample(rng, self.cards.len(), count).into_iter() {
            picked[position] = true;
        }

        let (drawn, remaining): (Vec<_>, Vec<_>) = self
            .cards
            .iter()
            .zip(picked)
            .partition(|(_, taken)| *taken);

        Ok((
            Deck::from_cards(remaining.into_iter().map(|(card, _)| *card).collect()),
            Hand::with_cards(drawn.into_iter().map(|(card, _)| *card).collect()),
        ))
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::{DECK_SIZE, DealError, Deck};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn draw_partitions_the_deck() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = Deck::standard();
        for count in [0, 1, 13, 40, 52] {
            let (rest, hand) = deck.draw_hand(count, &mut rng).unwrap();
            assert_eq!(hand.len(), count);
            assert_eq!(rest.len() + hand.len(), deck.len());
            for card in hand.iter() {
                assert!(!rest.contains(*card));
                assert!(deck.contains(*card));
            }
        }
        assert_eq!(deck.len(), 52, "source deck is not mutated");
    }

    #[test]
    fn draw_with_seed_is_deterministic() {
        let deck = Deck::standard();
        let (_, a) = deck.draw_hand(10, &mut StdRng::seed_from_u64(42)).unwrap();
        let (_, b) = deck.draw_hand(10, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.cards(), b.cards());
    }

    #[test]
    fn drawing_more_than_remaining_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let (rest, _) = Deck::standard().draw_hand(50, &mut rng).unwrap();
        assert_eq!(
            rest.draw_hand(3, &mut rng),
            Err(DealError::InsufficientCards {
                requested: 3,
                remaining: 2
            })
        );
    }
}
