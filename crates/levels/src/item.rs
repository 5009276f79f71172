//! Collectible items

use gridhunt_core::{ItemId, Position};
use serde::{Deserialize, Serialize};

/// A collectible treasure placed on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub position: Position,
    pub value: u32,
}

impl Item {
    pub const fn new(id: ItemId, position: Position, value: u32) -> Self {
        Self { id, position, value }
    }
}
