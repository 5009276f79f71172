//! # Player Manager
//!
//! This module manages the registry of all logged-in players.

use crate::player::{Player, PlayerSnapshot};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gridhunt_core::PlayerName;
use gridhunt_storage::PlayerRecord;
use std::sync::Arc;

/// Player Manager
///
/// # Purpose
/// Tracks all logged-in players by name and provides lookup/management functions.
///
/// # Thread Safety
/// All operations are thread-safe using DashMap for concurrent access.
/// Names hash case-insensitively, so "Ann" and "ANN" share one slot.
pub struct PlayerManager {
    /// All players
    /// Key: PlayerName, Value: Player handle
    players: DashMap<PlayerName, Arc<Player>>,
}

impl PlayerManager {
    /// Create a new player manager
    ///
    /// # Returns
    /// An empty manager ready to track players
    #[inline]
    pub fn new() -> Self {
        tracing::debug!("Creating PlayerManager");

        Self {
            players: DashMap::new(),
        }
    }

    /// Add a player unless the name is already taken
    ///
    /// # Arguments
    /// * `player` - The player to add
    ///
    /// # Returns
    /// `Err(player)` handing the player back if the name is in use. The check
    /// and the insert happen under the same shard lock.
    pub fn try_add_player(&self, player: Arc<Player>) -> Result<(), Arc<Player>> {
        match self.players.entry(player.name.clone()) {
            Entry::Occupied(_) => Err(player),
            Entry::Vacant(slot) => {
                tracing::debug!("Adding player {}", player.name);
                slot.insert(player);
                Ok(())
            }
        }
    }

    /// Remove a player from the manager
    ///
    /// # Arguments
    /// * `name` - The player name to remove
    #[inline]
    pub fn remove_player(&self, name: &PlayerName) -> Option<Arc<Player>> {
        tracing::debug!("Removing player {}", name);
        self.players.remove(name).map(|(_, player)| player)
    }

    /// Get a player by name
    ///
    /// # Returns
    /// `Some(player)` if found, `None` otherwise
    #[inline]
    pub fn get_player(&self, name: &PlayerName) -> Option<Arc<Player>> {
        self.players.get(name).map(|entry| entry.clone())
    }

    #[inline]
    pub fn contains(&self, name: &PlayerName) -> bool {
        self.players.contains_key(name)
    }

    /// Get the number of players
    #[inline]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Snapshot of every logged-in player
    pub fn snapshots(&self) -> Vec<PlayerSnapshot> {
        self.players.iter().map(|entry| entry.value().snapshot()).collect()
    }

    /// Storage records for every logged-in player
    pub fn records(&self) -> Vec<PlayerRecord> {
        self.players.iter().map(|entry| entry.value().to_record()).collect()
    }
}

impl Default for PlayerManager {
    fn default() -> Self {
        Self::new()
    }
}
