//! # Gridhunt Game Logic Layer
//!
//! This crate contains the command-dispatch and event-notification core.
//!
//! ## Modules
//!
//! - `player` - Player state
//! - `manager` - Shared player registry
//! - `world` - Shared game state handed to every handler
//! - `validation` - Composable command checks
//! - `handlers` - One handler per action
//! - `dispatcher` - Action to handler routing table
//! - `event` - Event and subject definitions, event to response mapping
//! - `event_manager` - Per-subject listener registry and fan-out
//! - `event_queue` - Per-listener asynchronous delivery
//! - `sink` - Output channel abstraction for a connection

pub mod player;
pub mod manager;
pub mod world;
pub mod validation;
pub mod handlers;
pub mod dispatcher;
pub mod event;
pub mod event_manager;
pub mod event_queue;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use player::{Player, PlayerSnapshot};
pub use manager::PlayerManager;
pub use world::World;
pub use validation::CommandError;
pub use handlers::{CommandHandler, Outcome, Publication};
pub use dispatcher::Dispatcher;
pub use event::{Event, Subject};
pub use event_manager::{EventListener, EventManager};
pub use event_queue::EventQueue;
pub use sink::ResponseSink;
