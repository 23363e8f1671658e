mod guess;
mod play;

pub use guess::GuessPlanner;
pub use play::PlayPlanner;

/// Lowest card value counted as a likely trick by the first guess pass.
pub const STRONG_VALUE: u8 = 7;
/// Stricter threshold used when the first guess breaks the hook rule.
pub const VERY_STRONG_VALUE: u8 = 9;
