pub mod bot;
pub mod policy;

pub use bot::{GuessPlanner, PlayPlanner};
pub use policy::{GuessContext, HeuristicPolicy, PlayContext, Policy};
