pub mod card;
pub mod deck;
pub mod guess;
pub mod hand;
pub mod player;
pub mod schedule;
pub mod score;
pub mod trick;
