//! Player command verbs

use std::fmt;

/// The verb of a player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Map,
    Message,
    Move,
    Players,
    Quit,
    Unknown,
}

impl Action {
    /// Every routable action (excludes `Unknown`)
    pub const ROUTABLE: [Action; 6] = [
        Action::Login,
        Action::Map,
        Action::Message,
        Action::Move,
        Action::Players,
        Action::Quit,
    ];

    /// Parse an action token, ignoring case
    ///
    /// Never fails: unrecognized tokens map to `Unknown`.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "login" => Self::Login,
            "map" => Self::Map,
            "message" => Self::Message,
            "move" => Self::Move,
            "players" => Self::Players,
            "quit" => Self::Quit,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Map => "map",
            Self::Message => "message",
            Self::Move => "move",
            Self::Players => "players",
            Self::Quit => "quit",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
