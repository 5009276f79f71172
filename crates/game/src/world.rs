//! # Shared World State
//!
//! Everything a command handler may touch: the map, the player registry,
//! the event manager and the player store.

use crate::event::Event;
use crate::event_manager::EventManager;
use crate::handlers::Publication;
use crate::manager::PlayerManager;
use crate::player::{Player, PlayerSnapshot};
use gridhunt_core::PlayerName;
use gridhunt_levels::GameMap;
use gridhunt_storage::{PlayerStore, StorageError};
use std::sync::Arc;

/// Shared game state
///
/// # Thread Safety
/// One `World` is shared by every connection task behind an `Arc`; each
/// field carries its own synchronisation.
pub struct World {
    pub map: Arc<GameMap>,
    pub players: PlayerManager,
    pub events: EventManager,
    pub store: Arc<dyn PlayerStore>,
}

impl World {
    pub fn new(map: Arc<GameMap>, store: Arc<dyn PlayerStore>) -> Self {
        Self {
            map,
            players: PlayerManager::new(),
            events: EventManager::new(),
            store,
        }
    }

    /// Deliver one handler publication
    pub fn publish(&self, publication: Publication) {
        match publication {
            Publication::Broadcast(event) => {
                self.events.notify(&event);
            }
            Publication::To(owner, event) => {
                self.events.notify_player(&owner, &event);
            }
        }
    }

    /// Write every online player to the store
    pub fn persist_all(&self) -> Result<(), StorageError> {
        let records = self.players.records();
        self.store.store(&records)?;
        tracing::debug!("Persisted {} players", records.len());
        Ok(())
    }

    /// Take `name` out of the game
    ///
    /// Persists every online player (the leaver included), removes the
    /// leaver from the registry and drops all of their subscriptions. A
    /// storage failure is logged and does not stop the departure.
    ///
    /// # Returns
    /// The departed player, or `None` if they were not registered
    pub fn depart(&self, name: &PlayerName) -> Option<Arc<Player>> {
        if let Err(e) = self.persist_all() {
            tracing::error!("Failed to persist players while {} leaves: {}", name, e);
        }

        let player = self.players.remove_player(name)?;
        self.events.unsubscribe_all(name);

        tracing::info!("{} left the game ({} remaining)", name, self.players.player_count());
        Some(player)
    }

    /// The broadcast announcing that `player` left
    pub fn departure_event(player: &Player) -> Event {
        Event::PlayerDisconnected(PlayerSnapshot::departed(player.name.clone()))
    }
}
