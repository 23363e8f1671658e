//! Binary encoding of [`Message`].
//!
//! The layout matches the fixed-int little-endian scheme the generated client libraries
//! speak: a `u32` variant tag, `u64` for every integer and for string, sequence and map
//! lengths, one byte for `bool` and for the `Option` tag. Maps are written in key order.

use crate::model::card::Card;
use crate::model::player::{Player, PlayerName};
use crate::model::score::{PublicState, StatePerPlayer};
use crate::model::trick::Trick;
use crate::protocol::message::Message;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Read, Write};

pub const MAX_FRAME_LEN: u32 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    UnknownVariant(u32),
    InvalidBool(u8),
    InvalidOptionTag(u8),
    InvalidUtf8,
    CardOutOfRange { suit: u64, value: u64 },
    LengthOverflow(u64),
    TrailingBytes(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "input ended mid-message"),
            DecodeError::UnknownVariant(tag) => write!(f, "unknown message index {tag}"),
            DecodeError::InvalidBool(byte) => write!(f, "invalid bool byte {byte}"),
            DecodeError::InvalidOptionTag(byte) => write!(f, "invalid option tag {byte}"),
            DecodeError::InvalidUtf8 => write!(f, "player name is not valid UTF-8"),
            DecodeError::CardOutOfRange { suit, value } => {
                write!(f, "card ({suit}, {value}) is not in the deck")
            }
            DecodeError::LengthOverflow(len) => write!(f, "length {len} does not fit in memory"),
            DecodeError::TrailingBytes(count) => {
                write!(f, "{count} bytes left over after the message")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug)]
pub enum FrameError {
    Io(io::Error),
    TooLarge(u32),
    Decode(DecodeError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Io(err) => write!(f, "frame i/o failed: {err}"),
            FrameError::TooLarge(len) => {
                write!(f, "frame of {len} bytes exceeds limit of {MAX_FRAME_LEN}")
            }
            FrameError::Decode(err) => write!(f, "frame payload rejected: {err}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Io(err) => Some(err),
            FrameError::Decode(err) => Some(err),
            FrameError::TooLarge(_) => None,
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        FrameError::Io(err)
    }
}

pub fn encode(message: &Message) -> Vec<u8> {
    let mut out = Encoder::default();
    out.u32(message.index());
    match message {
        Message::RequestGuessContext {
            player,
            hand,
            guesses,
            players,
        } => {
            out.player(player);
            out.cards(hand);
            out.usizes(guesses.iter().copied(), guesses.len());
            out.usize(*players);
        }
        Message::Guesses { state } | Message::Scoreboard { state } => out.state(state),
        Message::Turn { whose: player }
        | Message::Winner(player)
        | Message::PlayRequest(player) => out.player(player),
        Message::PlayRequestContext {
            player,
            hand,
            trick,
            valid_cards,
        } => {
            out.player(player);
            out.cards(hand);
            out.cards(&trick.0);
            match valid_cards {
                Some(indices) => {
                    out.u8(1);
                    out.usizes(indices.iter().copied(), indices.len());
                }
                None => out.u8(0),
            }
        }
        Message::Trick(trick) => out.cards(&trick.0),
        Message::Winners {
            players,
            winner_indices,
        } => {
            out.usize(players.len());
            for player in players {
                out.player(player);
            }
            out.usizes(winner_indices.iter().copied(), winner_indices.len());
        }
        Message::RequestPlayerName | Message::RequestGuess | Message::GameOver => {}
    }
    out.bytes
}

pub fn decode(input: &[u8]) -> Result<Message, DecodeError> {
    let mut reader = Decoder { input };
    let message = reader.message()?;
    if !reader.input.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.input.len()));
    }
    Ok(message)
}

/// Writes one length-prefixed frame.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, message: &Message) -> io::Result<()> {
    let payload = encode(message);
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    writer.write_u32::<LittleEndian>(len)?;
    writer.write_all(&payload)?;
    writer.flush()
}

pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Message, FrameError> {
    let len = reader.read_u32::<LittleEndian>()?;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }
    let mut payload = vec![0; len as usize];
    reader.read_exact(&mut payload)?;
    decode(&payload).map_err(FrameError::Decode)
}

#[derive(Default)]
struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn u32(&mut self, value: u32) {
        let mut buf = [0; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.bytes.extend_from_slice(&buf);
    }

    fn u64(&mut self, value: u64) {
        let mut buf = [0; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.bytes.extend_from_slice(&buf);
    }

    fn usize(&mut self, value: usize) {
        self.u64(value as u64);
    }

    fn usizes(&mut self, values: impl Iterator<Item = usize>, len: usize) {
        self.usize(len);
        for value in values {
            self.usize(value);
        }
    }

    fn string(&mut self, value: &str) {
        self.usize(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }

    fn card(&mut self, card: Card) {
        self.u64(u64::from(card.suit));
        self.u64(u64::from(card.value));
    }

    fn cards(&mut self, cards: &[Card]) {
        self.usize(cards.len());
        for card in cards {
            self.card(*card);
        }
    }

    fn player(&mut self, player: &Player) {
        self.string(player.name.as_str());
        self.u8(u8::from(player.human));
        self.cards(&player.hand);
    }

    fn public_state(&mut self, state: &PublicState) {
        match state.guess {
            Some(guess) => {
                self.u8(1);
                self.usize(guess);
            }
            None => self.u8(0),
        }
        self.usize(state.wins);
        self.usize(state.score);
    }

    fn state(&mut self, state: &StatePerPlayer) {
        self.usize(state.len());
        for (name, public) in state {
            self.string(name.as_str());
            self.public_state(public);
        }
    }
}

struct Decoder<'a> {
    input: &'a [u8],
}

impl Decoder<'_> {
    fn u8(&mut self) -> Result<u8, DecodeError> {
        self.input.read_u8().map_err(|_| DecodeError::UnexpectedEof)
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.input
            .read_u32::<LittleEndian>()
            .map_err(|_| DecodeError::UnexpectedEof)
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        self.input
            .read_u64::<LittleEndian>()
            .map_err(|_| DecodeError::UnexpectedEof)
    }

    fn usize(&mut self) -> Result<usize, DecodeError> {
        let value = self.u64()?;
        usize::try_from(value).map_err(|_| DecodeError::LengthOverflow(value))
    }

    /// A length prefix, bounded by what is left so corrupt input cannot force a large
    /// allocation.
    fn len(&mut self, min_item_size: usize) -> Result<usize, DecodeError> {
        let len = self.usize()?;
        if len.saturating_mul(min_item_size) > self.input.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(len)
    }

    fn bool(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    fn option_tag(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidOptionTag(other)),
        }
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.len(1)?;
        let (head, tail) = self.input.split_at(len);
        self.input = tail;
        String::from_utf8(head.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    fn usizes(&mut self) -> Result<Vec<usize>, DecodeError> {
        let len = self.len(8)?;
        (0..len).map(|_| self.usize()).collect()
    }

    fn card(&mut self) -> Result<Card, DecodeError> {
        let suit = self.u64()?;
        let value = self.u64()?;
        u8::try_from(suit)
            .ok()
            .zip(u8::try_from(value).ok())
            .and_then(|(s, v)| Card::new(s, v))
            .ok_or(DecodeError::CardOutOfRange { suit, value })
    }

    fn cards(&mut self) -> Result<Vec<Card>, DecodeError> {
        let len = self.len(16)?;
        (0..len).map(|_| self.card()).collect()
    }

    fn player(&mut self) -> Result<Player, DecodeError> {
        Ok(Player {
            name: PlayerName(self.string()?),
            human: self.bool()?,
            hand: self.cards()?,
        })
    }

    fn public_state(&mut self) -> Result<PublicState, DecodeError> {
        let guess = if self.option_tag()? {
            Some(self.usize()?)
        } else {
            None
        };
        Ok(PublicState {
            guess,
            wins: self.usize()?,
            score: self.usize()?,
        })
    }

    fn state(&mut self) -> Result<StatePerPlayer, DecodeError> {
        let len = self.len(8)?;
        (0..len)
            .map(|_| -> Result<_, DecodeError> {
                Ok((PlayerName(self.string()?), self.public_state()?))
            })
            .collect()
    }

    fn message(&mut self) -> Result<Message, DecodeError> {
        let message = match self.u32()? {
            0 => Message::RequestGuessContext {
                player: self.player()?,
                hand: self.cards()?,
                guesses: self.usizes()?,
                players: self.usize()?,
            },
            1 => Message::Guesses {
                state: self.state()?,
            },
            2 => Message::Turn {
                whose: self.player()?,
            },
            3 => Message::PlayRequestContext {
                player: self.player()?,
                hand: self.cards()?,
                trick: Trick(self.cards()?),
                valid_cards: if self.option_tag()? {
                    Some(self.usizes()?.into_iter().collect::<BTreeSet<_>>())
                } else {
                    None
                },
            },
            4 => Message::Trick(Trick(self.cards()?)),
            5 => Message::Scoreboard {
                state: self.state()?,
            },
            6 => Message::Winner(self.player()?),
            7 => {
                let len = self.len(8)?;
                let players = (0..len)
                    .map(|_| self.player())
                    .collect::<Result<Vec<_>, _>>()?;
                Message::Winners {
                    players,
                    winner_indices: self.usizes()?,
                }
            }
            8 => Message::RequestPlayerName,
            9 => Message::PlayRequest(self.player()?),
            10 => Message::RequestGuess,
            11 => Message::GameOver,
            other => return Err(DecodeError::UnknownVariant(other)),
        };
        Ok(message)
    }
}
