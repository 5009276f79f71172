//! # Gridhunt Networking Layer
//!
//! This crate provides the Tokio-based TCP front end of the game server.
//!
//! ## Modules
//!
//! - [`config`] - Socket-level server options
//! - [`codec`] - Request line decoder that survives bad lines
//! - [`writer`] - Line writer shared by a connection and its event queues
//! - [`connection`] - Per-connection read, dispatch and write loop
//! - [`server`] - Listener and accept loop

pub mod config;
pub mod codec;
pub mod writer;
pub mod connection;
pub mod server;

// Re-export commonly used items
pub use config::ServerConfig;
pub use codec::{BadLine, RequestCodec};
pub use writer::ConnectionWriter;
pub use connection::{PlayerConnection, ConnectionState};
pub use server::GameServer;
