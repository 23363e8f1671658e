use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use plump_bot::HeuristicPolicy;
use plump_core::model::player::PlayerName;
use plump_core::protocol::{Message, read_frame};
use plump_server::config::Timeouts;
use plump_server::lobby::Lobby;
use plump_server::table::{SeatController, Table, TableOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Clone, Copy)]
enum Mode {
    Text,
    Json,
    Binary,
}

/// Connects, takes a seat and answers every prompt by counting up from zero until the
/// server stops asking. Returns the names of the messages seen (or text lines).
fn play_remote(addr: SocketAddr, name: &str, mode: Mode) -> Vec<String> {
    let stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("timeout");
    let mut reader = BufReader::new(stream.try_clone().expect("clone"));
    let mut writer = stream;

    let mut greeting = String::new();
    reader.read_line(&mut greeting).expect("name prompt");
    assert!(greeting.starts_with("Please input player name"));
    let prefix = match mode {
        Mode::Text => "",
        Mode::Json => "|",
        Mode::Binary => "#",
    };
    writeln!(writer, "{prefix}{name}").expect("send name");

    let mut seen = Vec::new();
    let mut next = 0usize;
    loop {
        let (label, context, prompt, done) = match mode {
            Mode::Binary => {
                let message = read_frame(&mut reader).expect("frame");
                classify(&message)
            }
            Mode::Json => {
                let mut line = String::new();
                reader.read_line(&mut line).expect("json line");
                let message = Message::from_json(line.trim()).expect("valid json");
                classify(&message)
            }
            Mode::Text => {
                let mut line = String::new();
                assert!(reader.read_line(&mut line).expect("text line") > 0);
                let line = line.trim_end().to_string();
                let context = line.contains("Hand:");
                let prompt =
                    line.starts_with("Please make a guess") || line.contains("Select card to play");
                let done = line == "Game over.";
                (line, context, prompt, done)
            }
        };

        if context {
            next = 0;
        }
        if prompt {
            writeln!(writer, "{next}").expect("reply");
            next += 1;
        }
        seen.push(label);
        if done {
            return seen;
        }
    }
}

fn classify(message: &Message) -> (String, bool, bool, bool) {
    let context = matches!(
        message,
        Message::RequestGuessContext { .. } | Message::PlayRequestContext { .. }
    );
    let prompt = matches!(message, Message::RequestGuess | Message::PlayRequest(_));
    (
        message.name().to_string(),
        context,
        prompt,
        *message == Message::GameOver,
    )
}

#[test]
fn remote_seats_in_every_format_finish_a_game() {
    let timeouts = Timeouts {
        read: Duration::from_secs(10),
        write: Duration::from_secs(10),
    };
    let lobby = Lobby::bind("127.0.0.1:0".parse().unwrap(), timeouts).expect("bind");
    let addr = lobby.local_addr().expect("addr");

    let clients: Vec<_> = [("tess", Mode::Text), ("jay", Mode::Json), ("bina", Mode::Binary)]
        .into_iter()
        .map(|(name, mode)| thread::spawn(move || play_remote(addr, name, mode)))
        .collect();

    let mut taken = HashSet::from(["robot".to_string()]);
    let remote = lobby.fill(3, &mut taken).expect("seats filled");
    let mut seats = vec![SeatController::automated(
        PlayerName::new("robot"),
        Box::new(HeuristicPolicy::seeded(11)),
    )];
    seats.extend(
        remote
            .into_iter()
            .map(|seat| SeatController::human(seat.name, Box::new(seat.transport))),
    );

    let options = TableOptions {
        rounds: Some(1),
        max_invalid_replies: Some(20),
    };
    let summary = Table::new(seats, options, StdRng::seed_from_u64(2024))
        .expect("table")
        .run()
        .expect("game completes");
    assert_eq!(summary.rounds_played, 4);
    assert_eq!(summary.scores.len(), 4);

    for client in clients {
        let seen = client.join().expect("client thread");
        let winners = seen.len() - 2;
        assert!(
            seen[winners] == "Winners" || seen[winners].starts_with("The winner(s) is/are"),
            "unexpected final messages: {:?}",
            &seen[winners..]
        );
    }
}
