//! Gridhunt Configuration Management
//!
//! Loads the server options file: one `key = value` pair per line, `#`
//! starts a comment. Unknown keys are ignored and values that fail to parse
//! keep their default, so an old options file never stops the server.

use gridhunt_core::{GridError, Result};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the options file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "servers/default/config/serveroptions.txt";

const DEFAULT_PORT: u16 = 4500;
const DEFAULT_MAX_PLAYERS: usize = 64;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Complete server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Server name shown in the startup banner (from "name")
    pub name: String,
    /// Interface to listen on (from "bind_ip", `AUTO` means every interface)
    pub bind_ip: String,
    /// Listening port (from "port")
    pub port: u16,
    /// Simultaneous connections accepted (from "max_players")
    pub max_players: usize,
    /// Map layout file (from "map_file")
    pub map_file: PathBuf,
    /// Saved player data (from "players_file", empty keeps data in memory)
    pub players_file: Option<PathBuf>,
    /// Per-write socket timeout in milliseconds (from "write_timeout_ms")
    pub write_timeout_ms: u64,
    /// Longest request line accepted (from "max_line_length")
    pub max_line_length: usize,
    /// Default tracing filter when `RUST_LOG` is unset (from "log_level")
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Gridhunt".into(),
            bind_ip: "AUTO".into(),
            port: DEFAULT_PORT,
            max_players: DEFAULT_MAX_PLAYERS,
            map_file: PathBuf::from("servers/default/maps/default.txt"),
            players_file: Some(PathBuf::from("servers/default/players.csv")),
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_level: "info".into(),
        }
    }
}

impl GameConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GridError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    /// Load configuration from [`DEFAULT_CONFIG_PATH`]
    ///
    /// Directory structure:
    /// - ./gridhunt (executable)
    /// - ./servers/default/config/serveroptions.txt
    /// - ./servers/default/maps/ (layouts)
    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Parse options file content
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => config.parse_option(key.trim(), value.trim()),
                None => tracing::debug!("Ignoring config line without '=': {}", line),
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "name" => self.name = value.into(),
            "bind_ip" => self.bind_ip = value.into(),
            "port" => {
                self.port = value.parse().unwrap_or(DEFAULT_PORT);
            }
            "max_players" => {
                self.max_players = value.parse().unwrap_or(DEFAULT_MAX_PLAYERS);
            }
            "map_file" => self.map_file = PathBuf::from(value),
            "players_file" => {
                self.players_file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "write_timeout_ms" => {
                self.write_timeout_ms = value.parse().unwrap_or(DEFAULT_WRITE_TIMEOUT_MS);
            }
            "max_line_length" => {
                self.max_line_length = value.parse().unwrap_or(DEFAULT_MAX_LINE_LENGTH);
            }
            "log_level" => self.log_level = value.into(),
            _ => tracing::debug!("Unknown config option: {}", key),
        }
    }

    /// Get the bind address for the TCP listener
    pub fn bind_address(&self) -> SocketAddr {
        let ip = if self.bind_ip.eq_ignore_ascii_case("AUTO") || self.bind_ip.is_empty() {
            "0.0.0.0"
        } else {
            &self.bind_ip
        };

        format!("{}:{}", ip, self.port)
            .parse()
            .unwrap_or_else(|_| {
                tracing::warn!("Invalid bind_ip '{}', listening on every interface", self.bind_ip);
                SocketAddr::from(([0, 0, 0, 0], self.port))
            })
    }

    #[inline]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Server configuration:");
        tracing::info!("  Name: {}", self.name);
        tracing::info!("  Bind: {}", self.bind_address());
        tracing::info!("  Max Players: {}", self.max_players);
        tracing::info!("  Map: {}", self.map_file.display());
        match &self.players_file {
            Some(path) => tracing::info!("  Player data: {}", path.display()),
            None => tracing::info!("  Player data: (memory only)"),
        }
        tracing::info!("  Write timeout: {} ms", self.write_timeout_ms);
        tracing::info!("  Max line length: {}", self.max_line_length);
    }
}
