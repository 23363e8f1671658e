use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use plump_bot::HeuristicPolicy;
use plump_core::model::player::PlayerName;
use plump_core::model::schedule::{MAX_SEATS, MIN_SEATS};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

use plump_server::config::{LocalSeat, ServerConfig};
use plump_server::lobby::{Lobby, negotiate_name};
use plump_server::logging::init_logging;
use plump_server::table::{SeatController, Table, TableOptions};
use plump_server::transport::ConsoleTransport;

/// Table server for the Plump trick-taking card game.
#[derive(Debug, Parser)]
#[command(
    name = "plump-server",
    author,
    version,
    about = "Hosts a game of Plump for console, robot and network seats"
)]
struct Cli {
    /// Number of seats at the table; asked for when omitted.
    #[arg(value_name = "SEATS")]
    seats: Option<usize>,

    /// Path to a YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to accept network seats on.
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Address to bind the listener to.
    #[arg(long, value_name = "ADDR")]
    bind: Option<IpAddr>,

    /// Who sits at this console.
    #[arg(long, value_enum)]
    local: Option<LocalSeat>,

    /// Largest hand size of the game.
    #[arg(long, value_name = "N")]
    rounds: Option<usize>,

    /// Seed for dealing and robot play.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Number of robot seats besides the local one.
    #[arg(long, value_name = "COUNT")]
    bots: Option<usize>,
}

fn ask_seat_count() -> anyhow::Result<usize> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Number of seats ({MIN_SEATS}-{MAX_SEATS}): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            bail!("no seat count given");
        };
        match line?.trim().parse::<usize>() {
            Ok(seats) if (MIN_SEATS..=MAX_SEATS).contains(&seats) => return Ok(seats),
            _ => println!("Please enter a number from {MIN_SEATS} to {MAX_SEATS}."),
        }
    }
}

fn bot_policy(seed: Option<u64>, index: usize) -> HeuristicPolicy {
    match seed {
        Some(seed) => HeuristicPolicy::seeded(seed.wrapping_add(index as u64 + 1)),
        None => HeuristicPolicy::from_entropy(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => ServerConfig::from_path(path)?,
        None => ServerConfig::default(),
    };

    if let Some(seats) = cli.seats {
        config.seats = Some(seats);
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(local) = cli.local {
        config.local = local;
    }
    if let Some(rounds) = cli.rounds {
        config.rounds = Some(rounds);
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(bots) = cli.bots {
        config.bots = bots;
    }
    if config.seats.is_none() {
        config.seats = Some(ask_seat_count()?);
    }

    config.validate()?;
    let seats = config.require_seats()?;
    let _logging_guard = init_logging(&config.logging)?;

    let mut taken: HashSet<String> = HashSet::new();
    let mut controllers = Vec::with_capacity(seats);

    if config.local.occupies_seat() {
        let mut console = ConsoleTransport::stdio();
        let (name, _) =
            negotiate_name(&mut console, &taken).context("reading the local player name")?;
        taken.insert(name.as_str().to_string());
        let seat = match config.local {
            LocalSeat::Robot => SeatController::observed(
                name,
                Box::new(bot_policy(config.seed, 0)),
                Box::new(console),
            ),
            _ => SeatController::human(name, Box::new(console)),
        };
        controllers.push(seat);
    }

    for index in 0..config.bots {
        let mut name = config.bot_name(index);
        while taken.contains(&name) {
            name.push('\'');
        }
        taken.insert(name.clone());
        let policy = bot_policy(config.seed, config.local_seats() + index);
        controllers.push(SeatController::automated(PlayerName::new(name), Box::new(policy)));
    }

    let remote = config.remote_seats();
    if remote > 0 {
        let lobby = Lobby::bind(config.listen_addr(), config.timeouts())?;
        let addr = lobby.local_addr()?;
        println!("Waiting for {remote} player(s) on {addr}");
        event!(target: "plump_server", Level::INFO, %addr, remote, "lobby open");
        for seat in lobby.fill(remote, &mut taken)? {
            controllers.push(SeatController::human(seat.name, Box::new(seat.transport)));
        }
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let options = TableOptions {
        rounds: config.rounds,
        max_invalid_replies: config.max_invalid_replies,
    };
    let summary = Table::new(controllers, options, rng)?.run()?;

    let winners = summary
        .winners
        .iter()
        .map(PlayerName::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "Game complete after {} rounds; winner(s): {winners}",
        summary.rounds_played
    );
    for (name, score) in &summary.scores {
        println!("  {name}: {score}");
    }

    Ok(())
}
