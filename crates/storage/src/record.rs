//! Persisted player record

use crate::{Result, StorageError};
use gridhunt_core::{PlayerName, Position};
use serde::{Deserialize, Serialize};

/// Saved state of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: PlayerName,
    pub position: Position,
    pub score: u64,
}

impl PlayerRecord {
    pub fn new(name: PlayerName, position: Position, score: u64) -> Self {
        Self { name, position, score }
    }

    /// Encode as `name,x,y,score`
    pub fn to_csv(&self) -> String {
        format!("{},{},{},{}", self.name, self.position.x, self.position.y, self.score)
    }

    /// Decode a `name,x,y,score` line; `line_no` is only used for error reporting
    pub fn from_csv(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |message: &str| StorageError::Malformed {
            line: line_no,
            message: message.to_string(),
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [name, x, y, score] = fields.as_slice() else {
            return Err(malformed("expected 4 fields"));
        };

        if name.is_empty() {
            return Err(malformed("empty name"));
        }

        let x = x.parse().map_err(|_| malformed("invalid x"))?;
        let y = y.parse().map_err(|_| malformed("invalid y"))?;
        let score = score.parse().map_err(|_| malformed("invalid score"))?;

        Ok(Self::new(PlayerName::from(*name), Position::new(x, y), score))
    }
}
