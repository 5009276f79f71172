//! # Gridhunt Player Storage
//!
//! Durable player data: one `name,x,y,score` record per player.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gridhunt_storage::{CsvPlayerStore, PlayerStore};
//! use gridhunt_core::PlayerName;
//!
//! let store = CsvPlayerStore::new("servers/default/players.csv");
//! if let Some(record) = store.load(&PlayerName::from("Ann")).unwrap() {
//!     println!("Ann last seen at ({}) with {} points", record.position, record.score);
//! }
//! ```

mod error;
mod record;
mod store;

pub use error::{StorageError, Result};
pub use record::PlayerRecord;
pub use store::{CsvPlayerStore, MemoryPlayerStore, PlayerStore};
