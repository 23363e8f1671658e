use super::{STRONG_VALUE, VERY_STRONG_VALUE};
use plump_core::model::guess::is_valid_guess;
use plump_core::model::hand::Hand;

pub struct GuessPlanner;

impl GuessPlanner {
    /// Counts strong cards, retrying with a stricter threshold when the hook rule bites.
    ///
    /// This is the table's reference heuristic and may still produce an invalid guess
    /// (for instance one above the hand size); [`GuessPlanner::choose`] corrects that.
    pub fn heuristic(hand: &Hand, prior: &[usize], seat_count: usize) -> usize {
        let guess = count_at_least(hand, STRONG_VALUE);
        if is_valid_guess(hand.len(), prior, seat_count, guess) {
            return guess;
        }

        let stricter = count_at_least(hand, VERY_STRONG_VALUE);
        if stricter == guess { guess + 1 } else { stricter }
    }

    /// The heuristic guess, or the closest legal guess below it when the heuristic lands
    /// on a rejected value.
    pub fn choose(hand: &Hand, prior: &[usize], seat_count: usize) -> usize {
        let guess = Self::heuristic(hand, prior, seat_count);
        if is_valid_guess(hand.len(), prior, seat_count, guess) {
            return guess;
        }

        let capped = guess.min(hand.len());
        (0..=capped)
            .rev()
            .chain(capped + 1..=hand.len())
            .find(|candidate| is_valid_guess(hand.len(), prior, seat_count, *candidate))
            .unwrap_or(0)
    }
}

fn count_at_least(hand: &Hand, value: u8) -> usize {
    hand.iter().filter(|card| card.value >= value).count()
}

#[cfg(test)]
mod tests {
    use super::GuessPlanner;
    use plump_core::model::card::Card;
    use plump_core::model::guess::is_valid_guess;
    use plump_core::model::hand::Hand;

    fn hand(values: &[(u8, u8)]) -> Hand {
        Hand::with_cards(
            values
                .iter()
                .map(|(s, v)| Card::new(*s, *v).unwrap())
                .collect(),
        )
    }

    #[test]
    fn counts_cards_of_value_seven_and_up() {
        let cards = hand(&[(0, 7), (1, 12), (2, 6), (3, 0)]);
        assert_eq!(GuessPlanner::heuristic(&cards, &[], 4), 2);
    }

    #[test]
    fn hook_retry_uses_stricter_threshold() {
        let cards = hand(&[(0, 7), (1, 12), (2, 6), (3, 0)]);
        // Two strong cards would complete 4 with the prior 1 + 1.
        assert_eq!(GuessPlanner::heuristic(&cards, &[1, 1, 0], 4), 1);
    }

    #[test]
    fn hook_retry_bumps_when_thresholds_agree() {
        let cards = hand(&[(0, 10), (1, 2), (2, 3)]);
        assert_eq!(GuessPlanner::heuristic(&cards, &[1, 1], 3), 2);
    }

    #[test]
    fn choose_never_returns_an_illegal_guess() {
        // A single ace as last bidder facing a zero: the heuristic says 2.
        let cards = hand(&[(0, 12)]);
        assert_eq!(GuessPlanner::heuristic(&cards, &[0], 2), 2);
        let guess = GuessPlanner::choose(&cards, &[0], 2);
        assert_eq!(guess, 0);
        assert!(is_valid_guess(1, &[0], 2, guess));
    }

    #[test]
    fn choose_matches_heuristic_when_legal() {
        let cards = hand(&[(0, 8), (1, 9), (2, 1)]);
        assert_eq!(
            GuessPlanner::choose(&cards, &[], 4),
            GuessPlanner::heuristic(&cards, &[], 4)
        );
    }
}
