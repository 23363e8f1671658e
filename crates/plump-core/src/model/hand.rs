use crate::model::card::Card;
use std::vec::Vec;

/// Cards held by one seat for the active round, kept sorted by suit then value so that
/// hand indices shown to a remote seat stay stable between prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    /// Returns the hand without the card at `index`, together with that card.
    pub fn without(&self, index: usize) -> Option<(Card, Hand)> {
        let card = self.get(index)?;
        let mut cards = self.cards.clone();
        cards.remove(index);
        Some((card, Hand { cards }))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn to_vec(&self) -> Vec<Card> {
        self.cards.clone()
    }

    fn sort(&mut self) {
        self.cards.sort();
    }
}
