use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessError {
    OutOfRange { guess: usize, hand_size: usize },
    /// The last bidder may not make the guesses add up to the hand size.
    HookRule { guess: usize, hand_size: usize },
}

impl fmt::Display for GuessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessError::OutOfRange { guess, hand_size } => {
                write!(f, "guess {guess} is outside 0..={hand_size}")
            }
            GuessError::HookRule { guess, hand_size } => write!(
                f,
                "guess {guess} would make the guesses sum to the hand size {hand_size}"
            ),
        }
    }
}

impl std::error::Error for GuessError {}

pub fn validate_guess(
    hand_size: usize,
    prior: &[usize],
    seat_count: usize,
    guess: usize,
) -> Result<(), GuessError> {
    if guess > hand_size {
        return Err(GuessError::OutOfRange { guess, hand_size });
    }

    let last_to_guess = prior.len() + 1 == seat_count;
    if last_to_guess && prior.iter().sum::<usize>() + guess == hand_size {
        return Err(GuessError::HookRule { guess, hand_size });
    }

    Ok(())
}

pub fn is_valid_guess(hand_size: usize, prior: &[usize], seat_count: usize, guess: usize) -> bool {
    validate_guess(hand_size, prior, seat_count, guess).is_ok()
}

/// Index of the first highest guess; the leader of a round's first trick.
pub fn determine_start_player(guesses: &[usize]) -> usize {
    let Some(highest) = guesses.iter().max() else {
        return 0;
    };
    guesses
        .iter()
        .position(|guess| guess == highest)
        .unwrap_or(0)
}
