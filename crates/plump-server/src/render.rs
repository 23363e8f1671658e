//! Human-readable text for every message, used by console and text-mode network seats.

use itertools::Itertools;
use plump_core::model::card::Card;
use plump_core::model::player::Player;
use plump_core::model::score::{PublicState, StatePerPlayer};
use plump_core::model::trick::Trick;
use plump_core::protocol::Message;
use std::collections::BTreeSet;

const SUIT_SYMBOLS: [&str; 4] = ["♥", "♣", "♦", "♠"];
const RANK_SYMBOLS: [&str; 13] = [
    "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
];
const HIT_FACE: char = '\u{1F642}';
const MISS_FACE: char = '\u{1F643}';

fn darken(text: &str) -> String {
    format!("\x1b[90m{text}\x1b[0m")
}

pub fn card_symbol(card: Card) -> String {
    let suit = SUIT_SYMBOLS
        .get(usize::from(card.suit))
        .copied()
        .unwrap_or("?");
    let rank = RANK_SYMBOLS
        .get(usize::from(card.value))
        .copied()
        .unwrap_or("?");
    format!("{suit}{rank}")
}

fn render_trick(trick: &Trick) -> Option<String> {
    (!trick.is_empty()).then(|| {
        trick
            .cards()
            .iter()
            .map(|card| card_symbol(*card))
            .join(" ")
    })
}

fn render_hand(hand: &[Card], valid: Option<&BTreeSet<usize>>, with_indices: bool) -> String {
    hand.iter()
        .enumerate()
        .map(|(index, card)| {
            let text = if with_indices {
                format!("{index}|{}", card_symbol(*card))
            } else {
                card_symbol(*card)
            };
            match valid {
                Some(valid) if !valid.contains(&index) => darken(&text),
                _ => text,
            }
        })
        .join(" ")
}

fn render_guess(state: &PublicState) -> String {
    state
        .guess
        .map_or_else(|| "?".to_string(), |guess| guess.to_string())
}

fn render_guesses(state: &StatePerPlayer) -> String {
    let guesses = state
        .iter()
        .map(|(name, public)| format!("{name}: {}", render_guess(public)))
        .join(", ");
    format!("Guesses: {guesses}")
}

fn render_scoreboard(state: &StatePerPlayer) -> String {
    state
        .iter()
        .map(|(name, public)| {
            let face = if public.hit() { HIT_FACE } else { MISS_FACE };
            format!(
                "{name}: {}/{} {face} (total: {})",
                public.wins,
                render_guess(public),
                public.score
            )
        })
        .join(", ")
}

fn render_winners(players: &[Player], winner_indices: &[usize]) -> String {
    let names = winner_indices
        .iter()
        .filter_map(|index| players.get(*index))
        .map(|player| player.name.as_str())
        .join(", ");
    format!("The winner(s) is/are {names}!")
}

/// Text shown for `message`, without a trailing newline.
pub fn render(message: &Message) -> String {
    match message {
        Message::RequestGuessContext {
            player,
            hand,
            guesses,
            players,
        } => {
            let guesses = guesses.iter().map(ToString::to_string).join(" ");
            format!(
                "{}: Hand: {}, Previous Guesses: {guesses}, Players: {players}",
                player.name,
                render_hand(hand, None, false)
            )
        }
        Message::Guesses { state } => render_guesses(state),
        Message::Turn { whose } => format!("{}'s turn", whose.name),
        Message::PlayRequestContext {
            player,
            hand,
            trick,
            valid_cards,
        } => {
            let table = render_trick(trick)
                .map_or_else(|| "You go first!".to_string(), |text| format!("Trick: {text}"));
            format!(
                "{}: Hand: {}, {table}",
                player.name,
                render_hand(hand, valid_cards.as_ref(), true)
            )
        }
        Message::Trick(trick) => render_trick(trick).unwrap_or_default(),
        Message::Scoreboard { state } => render_scoreboard(state),
        Message::Winner(player) => format!("{} won!", player.name),
        Message::Winners {
            players,
            winner_indices,
        } => render_winners(players, winner_indices),
        Message::RequestPlayerName => "Please input player name: ".to_string(),
        Message::PlayRequest(player) => {
            format!("{}: Select card to play (leftmost is 0): ", player.name)
        }
        Message::RequestGuess => "Please make a guess: ".to_string(),
        Message::GameOver => "Game over.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{card_symbol, render};
    use plump_core::model::card::Card;
    use plump_core::model::player::{Player, PlayerName};
    use plump_core::model::score::{PublicState, StatePerPlayer};
    use plump_core::model::trick::Trick;
    use plump_core::protocol::Message;
    use std::collections::BTreeSet;

    fn card(suit: u8, value: u8) -> Card {
        Card::new(suit, value).unwrap()
    }

    fn player(name: &str) -> Player {
        Player {
            name: PlayerName::new(name),
            human: true,
            hand: Vec::new(),
        }
    }

    #[test]
    fn symbols_cover_suits_and_ranks() {
        assert_eq!(card_symbol(card(0, 0)), "♥2");
        assert_eq!(card_symbol(card(3, 12)), "♠A");
        assert_eq!(card_symbol(card(2, 8)), "♦10");
    }

    #[test]
    fn play_context_darkens_unplayable_cards() {
        let message = Message::PlayRequestContext {
            player: player("ada"),
            hand: vec![card(0, 1), card(1, 9)],
            trick: Trick(vec![card(0, 5)]),
            valid_cards: Some(BTreeSet::from([0])),
        };
        assert_eq!(
            render(&message),
            "ada: Hand: 0|♥3 \x1b[90m1|♣J\x1b[0m, Trick: ♥7"
        );
    }

    #[test]
    fn empty_trick_invites_the_lead() {
        let message = Message::PlayRequestContext {
            player: player("ada"),
            hand: vec![card(1, 12)],
            trick: Trick::new(),
            valid_cards: None,
        };
        assert_eq!(render(&message), "ada: Hand: 0|♣A, You go first!");
    }

    #[test]
    fn scoreboard_marks_hits_and_misses() {
        let mut state = StatePerPlayer::new();
        state.insert(
            PlayerName::new("bo"),
            PublicState {
                guess: Some(1),
                wins: 0,
                score: 20,
            },
        );
        state.insert(
            PlayerName::new("al"),
            PublicState {
                guess: Some(2),
                wins: 2,
                score: 40,
            },
        );
        assert_eq!(
            render(&Message::Scoreboard { state }),
            "al: 2/2 \u{1F642} (total: 40), bo: 0/1 \u{1F643} (total: 20)"
        );
    }

    #[test]
    fn guesses_show_unknown_as_question_mark() {
        let mut state = StatePerPlayer::new();
        state.insert(PlayerName::new("al"), PublicState::new().with_guess(3));
        state.insert(PlayerName::new("bo"), PublicState::new());
        assert_eq!(render(&Message::Guesses { state }), "Guesses: al: 3, bo: ?");
    }

    #[test]
    fn winners_line_names_every_winner() {
        let message = Message::Winners {
            players: vec![player("al"), player("bo"), player("cy")],
            winner_indices: vec![0, 2],
        };
        assert_eq!(render(&message), "The winner(s) is/are al, cy!");
    }
}
