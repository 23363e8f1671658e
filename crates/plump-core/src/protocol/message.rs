use crate::model::card::Card;
use crate::model::player::Player;
use crate::model::score::StatePerPlayer;
use crate::model::trick::Trick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything the table sends to a seat. Variant order is the wire index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    RequestGuessContext {
        player: Player,
        hand: Vec<Card>,
        guesses: Vec<usize>,
        players: usize,
    },
    Guesses {
        state: StatePerPlayer,
    },
    Turn {
        whose: Player,
    },
    PlayRequestContext {
        player: Player,
        hand: Vec<Card>,
        trick: Trick,
        valid_cards: Option<BTreeSet<usize>>,
    },
    Trick(Trick),
    Scoreboard {
        state: StatePerPlayer,
    },
    Winner(Player),
    Winners {
        players: Vec<Player>,
        winner_indices: Vec<usize>,
    },
    RequestPlayerName,
    PlayRequest(Player),
    RequestGuess,
    GameOver,
}

impl Message {
    pub const COUNT: u32 = 12;

    pub const fn index(&self) -> u32 {
        match self {
            Message::RequestGuessContext { .. } => 0,
            Message::Guesses { .. } => 1,
            Message::Turn { .. } => 2,
            Message::PlayRequestContext { .. } => 3,
            Message::Trick(_) => 4,
            Message::Scoreboard { .. } => 5,
            Message::Winner(_) => 6,
            Message::Winners { .. } => 7,
            Message::RequestPlayerName => 8,
            Message::PlayRequest(_) => 9,
            Message::RequestGuess => 10,
            Message::GameOver => 11,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Message::RequestGuessContext { .. } => "RequestGuessContext",
            Message::Guesses { .. } => "Guesses",
            Message::Turn { .. } => "Turn",
            Message::PlayRequestContext { .. } => "PlayRequestContext",
            Message::Trick(_) => "Trick",
            Message::Scoreboard { .. } => "Scoreboard",
            Message::Winner(_) => "Winner",
            Message::Winners { .. } => "Winners",
            Message::RequestPlayerName => "RequestPlayerName",
            Message::PlayRequest(_) => "PlayRequest",
            Message::RequestGuess => "RequestGuess",
            Message::GameOver => "GameOver",
        }
    }

    /// Whether the message expects a reply line from the seat it is sent to.
    pub const fn is_prompt(&self) -> bool {
        matches!(
            self,
            Message::RequestPlayerName | Message::RequestGuess | Message::PlayRequest(_)
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use crate::model::card::Card;
    use crate::model::player::{Player, PlayerName};
    use crate::model::trick::Trick;

    #[test]
    fn indices_follow_declaration_order() {
        let player = Player {
            name: PlayerName::new("x"),
            human: false,
            hand: Vec::new(),
        };
        assert_eq!(Message::Trick(Trick::new()).index(), 4);
        assert_eq!(Message::PlayRequest(player).index(), 9);
        assert_eq!(Message::GameOver.index(), Message::COUNT - 1);
        assert_eq!(Message::RequestGuess.name(), "RequestGuess");
    }

    #[test]
    fn json_uses_variant_names() {
        let message = Message::Trick(Trick(vec![Card::new(1, 2).unwrap()]));
        let json = message.to_json().unwrap();
        assert_eq!(json, r#"{"Trick":[{"suit":1,"value":2}]}"#);
        assert_eq!(Message::from_json(&json).unwrap(), message);
        assert_eq!(Message::GameOver.to_json().unwrap(), r#""GameOver""#);
    }
}
