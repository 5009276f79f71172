//! Parsed player commands and their outcome records

use crate::{Action, Response};
use gridhunt_core::PlayerName;
use std::fmt;

/// Numeric status carried on every response line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Unknown = 0,
    Message = 100,
    PlayerUpdate = 101,
    ItemNotification = 102,
    ItemTaken = 103,
    MapData = 104,
    Success = 200,
    BadRequest = 400,
    ServerError = 500,
}

impl ResultCode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            100 => Some(Self::Message),
            101 => Some(Self::PlayerUpdate),
            102 => Some(Self::ItemNotification),
            103 => Some(Self::ItemTaken),
            104 => Some(Self::MapData),
            200 => Some(Self::Success),
            400 => Some(Self::BadRequest),
            500 => Some(Self::ServerError),
            _ => None,
        }
    }

    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A parsed request line
///
/// Carries the identity of the connection's player, which is `None` until a
/// login succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub player: Option<PlayerName>,
    pub action: Action,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(player: Option<PlayerName>, action: Action, args: Vec<String>) -> Self {
        Self { player, action, args }
    }

    /// Parse one request line
    ///
    /// The first whitespace-separated token selects the action; the rest are
    /// arguments. An empty line parses as `Unknown` with no arguments.
    pub fn parse(line: &str, player: Option<PlayerName>) -> Self {
        let mut tokens = line.split_whitespace();
        let action = tokens.next().map(Action::parse).unwrap_or(Action::Unknown);
        let args = tokens.map(str::to_string).collect();

        Self { player, action, args }
    }
}

/// Outcome of one processed command, answered on the synchronous channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub player: Option<PlayerName>,
    pub code: ResultCode,
    pub message: String,
}

impl CommandResult {
    pub fn new(player: Option<PlayerName>, code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            player,
            code,
            message: message.into(),
        }
    }

    pub fn success(player: Option<PlayerName>, message: impl Into<String>) -> Self {
        Self::new(player, ResultCode::Success, message)
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }

    pub fn to_response(&self) -> Response {
        Response::new(self.code, self.message.clone())
    }
}
