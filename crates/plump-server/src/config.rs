use clap::ValueEnum;
use plump_core::model::schedule::{DEFAULT_ROUNDS, MAX_SEATS, MIN_SEATS, RoundSchedule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 9999;
const DEFAULT_READ_TIMEOUT_MS: u64 = 300_000;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 10_000;
pub const NAME_MAX_LEN: usize = 32;

/// Who sits at the operator's own console, if anyone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LocalSeat {
    None,
    #[default]
    Human,
    Robot,
}

impl LocalSeat {
    pub const fn occupies_seat(self) -> bool {
        !matches!(self, LocalSeat::None)
    }
}

/// Table server configuration loaded from YAML; every field has a default.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub seats: Option<usize>,
    pub rounds: Option<usize>,
    pub bind: IpAddr,
    pub port: u16,
    pub local: LocalSeat,
    pub bots: usize,
    pub bot_names: Vec<String>,
    pub seed: Option<u64>,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_invalid_replies: Option<u32>,
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            seats: None,
            rounds: None,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            local: LocalSeat::default(),
            bots: 0,
            bot_names: Vec::new(),
            seed: None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            max_invalid_replies: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ServerConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate without performing I/O. A missing seat count is accepted here and
    /// checked again once the operator has supplied it.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if let Some(seats) = self.seats {
            validate_seats(seats)?;
            if self.local_seats() + self.bots > seats {
                return Err(invalid(
                    "bots",
                    format!(
                        "{} bots and {} local seat(s) do not fit at a table of {seats}",
                        self.bots,
                        self.local_seats()
                    ),
                ));
            }
            if let Err(err) = RoundSchedule::new(self.rounds_or_default(), seats) {
                return Err(invalid("rounds", err.to_string()));
            }
        } else if self.rounds == Some(0) {
            return Err(invalid("rounds", "at least one round is required"));
        }

        if self.read_timeout_ms == 0 {
            return Err(invalid("read_timeout_ms", "timeout must be greater than zero"));
        }
        if self.write_timeout_ms == 0 {
            return Err(invalid("write_timeout_ms", "timeout must be greater than zero"));
        }
        if self.max_invalid_replies == Some(0) {
            return Err(invalid(
                "max_invalid_replies",
                "limit must be at least 1; omit it for no limit",
            ));
        }

        validate_bot_names(&mut self.bot_names)?;
        self.logging.normalize();
        Ok(())
    }

    /// The seat count, failing if it is still unknown.
    pub fn require_seats(&self) -> Result<usize, ValidationError> {
        self.seats
            .ok_or_else(|| invalid("seats", "seat count must be provided"))
    }

    pub fn rounds_or_default(&self) -> usize {
        self.rounds.unwrap_or(DEFAULT_ROUNDS)
    }

    pub const fn local_seats(&self) -> usize {
        if self.local.occupies_seat() { 1 } else { 0 }
    }

    /// Seats filled by network clients.
    pub fn remote_seats(&self) -> usize {
        self.seats
            .map(|seats| seats.saturating_sub(self.local_seats() + self.bots))
            .unwrap_or(0)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_millis(self.read_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
        }
    }

    /// Name for the `index`-th bot, from `bot_names` when configured.
    pub fn bot_name(&self, index: usize) -> String {
        self.bot_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Bot {}", index + 1))
    }
}

/// Socket timeouts applied to every network seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            write: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

/// Console logs by default; a JSON file when `json_path` is set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            tracing_level: default_tracing_level(),
            json_path: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_seats(seats: usize) -> Result<(), ValidationError> {
    if (MIN_SEATS..=MAX_SEATS).contains(&seats) {
        Ok(())
    } else {
        Err(invalid(
            "seats",
            format!("a table seats {MIN_SEATS} to {MAX_SEATS} players, got {seats}"),
        ))
    }
}

fn validate_bot_names(names: &mut [String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names.iter_mut() {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(invalid("bot_names", "bot name must not be empty"));
        }
        if trimmed.len() > NAME_MAX_LEN {
            return Err(invalid(
                "bot_names",
                format!("bot name '{trimmed}' is longer than {NAME_MAX_LEN} bytes"),
            ));
        }
        if !seen.insert(trimmed.to_string()) {
            return Err(invalid(
                "bot_names",
                format!("bot name '{trimmed}' defined more than once"),
            ));
        }
        *name = trimmed.to_string();
    }
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
