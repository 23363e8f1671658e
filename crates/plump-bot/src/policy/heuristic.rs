use super::{GuessContext, PlayContext, Policy};
use crate::bot::{GuessPlanner, PlayPlanner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{Level, event};

/// Strong-card counting for guesses, uniform random legal card for play.
pub struct HeuristicPolicy<R = StdRng> {
    rng: R,
}

impl HeuristicPolicy<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> HeuristicPolicy<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Policy for HeuristicPolicy<R> {
    fn choose_guess(&mut self, ctx: &GuessContext) -> usize {
        let heuristic = GuessPlanner::heuristic(ctx.hand, ctx.prior_guesses, ctx.seat_count);
        let guess = GuessPlanner::choose(ctx.hand, ctx.prior_guesses, ctx.seat_count);
        event!(
            target: "plump_bot::policy",
            Level::DEBUG,
            seat = %ctx.seat,
            hand_size = ctx.hand.len(),
            prior = ?ctx.prior_guesses,
            heuristic,
            guess,
            "automated guess"
        );
        guess
    }

    fn choose_play(&mut self, ctx: &PlayContext) -> usize {
        let index = PlayPlanner::choose(&ctx.playable, &mut self.rng).unwrap_or(0);
        event!(
            target: "plump_bot::policy",
            Level::DEBUG,
            seat = %ctx.seat,
            legal_count = ctx.playable.len(),
            trick_len = ctx.trick.len(),
            index,
            "automated play"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::HeuristicPolicy;
    use crate::policy::{GuessContext, PlayContext, Policy};
    use plump_core::game::{GameState, SeatConfig};
    use plump_core::model::guess::is_valid_guess;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dealt(seed: u64) -> GameState {
        let seats = vec![
            SeatConfig::new("a", false),
            SeatConfig::new("b", false),
            SeatConfig::new("c", false),
        ];
        GameState::new(seats, Some(5))
            .unwrap()
            .deal(&mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn guesses_are_always_accepted_by_the_table() {
        let mut policy = HeuristicPolicy::seeded(1);
        for seed in 0..50 {
            let mut state = dealt(seed);
            while let Some(seat) = state.bidder() {
                let guess = policy.choose_guess(&GuessContext::from_state(&state, seat));
                assert!(is_valid_guess(
                    state.hand_size(),
                    state.prior_guesses(),
                    state.seat_count(),
                    guess
                ));
                state = state.submit_guess(seat, guess).unwrap();
            }
        }
    }

    #[test]
    fn seeded_play_is_reproducible() {
        let mut state = dealt(7);
        let mut policy = HeuristicPolicy::seeded(1);
        while let Some(seat) = state.bidder() {
            let guess = policy.choose_guess(&GuessContext::from_state(&state, seat));
            state = state.submit_guess(seat, guess).unwrap();
        }

        let leader = state.player_to_act().unwrap();
        let ctx = PlayContext::from_state(&state, leader);
        let first = HeuristicPolicy::seeded(99).choose_play(&ctx);
        let second = HeuristicPolicy::seeded(99).choose_play(&ctx);
        assert_eq!(first, second);
        assert!(ctx.playable.contains(&first));
    }
}
