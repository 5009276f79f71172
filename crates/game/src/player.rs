//! # Player State
//!
//! Identity, position and score of a logged-in player.

use gridhunt_core::{PlayerName, Position};
use gridhunt_storage::PlayerRecord;
use parking_lot::Mutex;

/// Mutable part of a player
#[derive(Debug, Clone, Copy)]
struct PlayerState {
    position: Position,
    score: u64,
}

/// Individual player
///
/// # Thread Safety
/// The name is fixed at login. Position and score sit behind a `Mutex`
/// because other connections read them (player listings, persistence)
/// while the owner's connection moves the player.
#[derive(Debug)]
pub struct Player {
    pub name: PlayerName,
    state: Mutex<PlayerState>,
}

impl Player {
    pub fn new(name: PlayerName, position: Position, score: u64) -> Self {
        tracing::debug!("Creating player {} at ({}) with score {}", name, position, score);

        Self {
            name,
            state: Mutex::new(PlayerState { position, score }),
        }
    }

    pub fn position(&self) -> Position {
        self.state.lock().position
    }

    pub fn score(&self) -> u64 {
        self.state.lock().score
    }

    pub fn set_position(&self, position: Position) {
        self.state.lock().position = position;
    }

    /// Add `points` to the score and return the new total
    pub fn add_score(&self, points: u64) -> u64 {
        let mut state = self.state.lock();
        state.score += points;
        state.score
    }

    /// Consistent copy of name, position and score
    pub fn snapshot(&self) -> PlayerSnapshot {
        let state = *self.state.lock();
        PlayerSnapshot {
            name: self.name.clone(),
            position: state.position,
            score: state.score,
        }
    }

    pub fn to_record(&self) -> PlayerRecord {
        let snapshot = self.snapshot();
        PlayerRecord::new(snapshot.name, snapshot.position, snapshot.score)
    }
}

/// Point-in-time copy of a player, carried by events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub name: PlayerName,
    pub position: Position,
    pub score: u64,
}

impl PlayerSnapshot {
    /// Snapshot announcing that `name` left: sentinel position, zero score
    pub fn departed(name: PlayerName) -> Self {
        Self {
            name,
            position: Position::GONE,
            score: 0,
        }
    }
}
