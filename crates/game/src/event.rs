//! # Events
//!
//! Notifications of world changes, routed to listeners by [`Subject`].
//!
//! # Wire Mapping
//!
//! | Subject              | Lines                                             |
//! |----------------------|---------------------------------------------------|
//! | `SendMessage`        | `100:<text>`                                      |
//! | `PlayerConnected`    | `101:<name>, <x>, <y>, <score>`                   |
//! | `PlayerUpdate`       | `101:<name>, <x>, <y>, <score>`                   |
//! | `PlayerDisconnected` | `101:<name>, -1, -1, 0, disconnected`             |
//! | `ItemData`           | `102:<id>, <x>, <y>, <value>`                     |
//! | `ItemCollected`      | `103:<name>, <id>, <x>, <y>, <value>`             |
//! | `MapData`            | `104:<rows>,<cols>` then one `104:<row>` per row  |

use crate::player::PlayerSnapshot;
use gridhunt_levels::{GameMap, Item};
use gridhunt_protocol::{Response, ResultCode};
use std::fmt;
use std::sync::Arc;

/// Event category used for subscription routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    MapData,
    ItemData,
    ItemCollected,
    PlayerConnected,
    PlayerDisconnected,
    PlayerUpdate,
    SendMessage,
}

impl Subject {
    pub const ALL: [Subject; 7] = [
        Subject::MapData,
        Subject::ItemData,
        Subject::ItemCollected,
        Subject::PlayerConnected,
        Subject::PlayerDisconnected,
        Subject::PlayerUpdate,
        Subject::SendMessage,
    ];
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A published world change
#[derive(Debug, Clone)]
pub enum Event {
    MapData(Arc<GameMap>),
    ItemData(Item),
    ItemCollected { player: PlayerSnapshot, item: Item },
    PlayerConnected(PlayerSnapshot),
    PlayerDisconnected(PlayerSnapshot),
    PlayerUpdate(PlayerSnapshot),
    SendMessage(String),
}

impl Event {
    pub fn subject(&self) -> Subject {
        match self {
            Self::MapData(_) => Subject::MapData,
            Self::ItemData(_) => Subject::ItemData,
            Self::ItemCollected { .. } => Subject::ItemCollected,
            Self::PlayerConnected(_) => Subject::PlayerConnected,
            Self::PlayerDisconnected(_) => Subject::PlayerDisconnected,
            Self::PlayerUpdate(_) => Subject::PlayerUpdate,
            Self::SendMessage(_) => Subject::SendMessage,
        }
    }

    /// Convert to the response lines written to a subscriber
    pub fn to_responses(&self) -> Vec<Response> {
        match self {
            Self::MapData(map) => {
                let mut lines = Vec::with_capacity(map.rows() + 1);
                lines.push(Response::new(
                    ResultCode::MapData,
                    format!("{},{}", map.rows(), map.cols()),
                ));
                lines.extend(
                    (0..map.rows())
                        .filter_map(|i| map.row_view(i))
                        .map(|row| Response::new(ResultCode::MapData, row)),
                );
                lines
            }
            Self::ItemData(item) => vec![Response::new(
                ResultCode::ItemNotification,
                format!("{}, {}, {}", item.id, item.position, item.value),
            )],
            Self::ItemCollected { player, item } => vec![Response::new(
                ResultCode::ItemTaken,
                format!("{}, {}, {}, {}", player.name, item.id, item.position, item.value),
            )],
            Self::PlayerConnected(player) | Self::PlayerUpdate(player) => vec![Response::new(
                ResultCode::PlayerUpdate,
                format!("{}, {}, {}", player.name, player.position, player.score),
            )],
            Self::PlayerDisconnected(player) => vec![Response::new(
                ResultCode::PlayerUpdate,
                format!("{}, {}, {}, disconnected", player.name, player.position, player.score),
            )],
            Self::SendMessage(text) => vec![Response::new(ResultCode::Message, text.clone())],
        }
    }
}
