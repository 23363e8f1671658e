use crate::model::card::Card;
use crate::model::hand::Hand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cards played so far in the active trick, in play order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick(pub Vec<Card>);

impl Trick {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lead(&self) -> Option<Card> {
        self.0.first().copied()
    }

    pub fn lead_suit(&self) -> Option<u8> {
        self.lead().map(|card| card.suit)
    }

    pub fn with_card(&self, card: Card) -> Trick {
        let mut cards = self.0.clone();
        cards.push(card);
        Trick(cards)
    }
}

/// Indices into `hand` that may legally be played onto `trick`.
pub fn playable_indices(hand: &Hand, trick: &Trick) -> Vec<usize> {
    let all = || (0..hand.len()).collect::<Vec<usize>>();
    let Some(suit) = trick.lead_suit() else {
        return all();
    };

    let following: Vec<usize> = hand
        .iter()
        .enumerate()
        .filter_map(|(index, card)| (card.suit == suit).then_some(index))
        .collect();

    if following.is_empty() { all() } else { following }
}

/// The restriction sent with a play request: the cards following the led suit, or
/// `None` when leading or void in that suit.
pub fn legal_restriction(hand: &Hand, trick: &Trick) -> Option<BTreeSet<usize>> {
    let suit = trick.lead_suit()?;
    let following: BTreeSet<usize> = hand
        .iter()
        .enumerate()
        .filter_map(|(index, card)| (card.suit == suit).then_some(index))
        .collect();
    (!following.is_empty()).then_some(following)
}

/// Position within the trick of the highest card of the led suit.
pub fn determine_winner(trick: &Trick) -> Option<usize> {
    let lead = trick.lead()?;
    let (position, _) = trick.cards().iter().enumerate().skip(1).fold(
        (0, lead),
        |(best_position, best), (position, card)| {
            if card.beats(best) == Some(true) {
                (position, *card)
            } else {
                (best_position, best)
            }
        },
    );
    Some(position)
}
