use plump_bot::{GuessContext, HeuristicPolicy, PlayContext, Policy};
use plump_core::game::{GameState, Phase, PlayOutcome, SeatConfig};
use plump_core::model::guess::is_valid_guess;
use plump_core::model::player::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;

const SEED: u64 = 41;

#[test]
fn seeded_robots_play_a_single_card_round() {
    let seats = (0..4)
        .map(|i| SeatConfig::new(format!("bot-{i}"), false))
        .collect();
    let state = GameState::new(seats, Some(1)).expect("valid table");
    let mut policies: Vec<HeuristicPolicy> = (0..4)
        .map(|i| HeuristicPolicy::seeded(SEED + i + 1))
        .collect();

    let mut state = state.deal(&mut StdRng::seed_from_u64(SEED)).expect("deal");
    assert_eq!(state.deck_len(), 48);

    while let Some(seat) = state.bidder() {
        let guess = policies[seat.index()].choose_guess(&GuessContext::from_state(&state, seat));
        assert!(is_valid_guess(1, state.prior_guesses(), 4, guess));
        state = state.submit_guess(seat, guess).expect("robot guess is legal");
    }
    assert_eq!(state.phase(), Phase::Playing);

    let mut winners: Vec<Seat> = Vec::new();
    while let Some(seat) = state.player_to_act() {
        let index = policies[seat.index()].choose_play(&PlayContext::from_state(&state, seat));
        let (next, outcome) = state.play_card(seat, index).expect("robot play is legal");
        if let PlayOutcome::TrickCompleted { winner, .. } = outcome {
            winners.push(winner);
        }
        state = next;
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(state.phase(), Phase::Scoring);

    let wins: Vec<usize> = state.public_states().iter().map(|s| s.wins).collect();
    assert_eq!(wins.iter().sum::<usize>(), 1);
    assert_eq!(wins[winners[0].index()], 1);

    let before = state.public_states().to_vec();
    let scored = state.finish_round().expect("scoring");
    for (old, new) in before.iter().zip(scored.public_states()) {
        let delta = new.score - old.score;
        match old.guess {
            Some(guess) if guess == old.wins => assert_eq!(delta, (10 * guess).max(10)),
            _ => assert_eq!(delta, 0),
        }
    }
}
