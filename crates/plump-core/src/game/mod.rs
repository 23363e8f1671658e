pub mod state;

pub use state::{GameError, GameState, Phase, PlayOutcome, SeatConfig};
