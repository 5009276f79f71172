//! # Server Configuration
//!
//! Socket-level options for the networking layer.
//!
//! # Example
//!
//! ```rust
//! use gridhunt_network::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig {
//!     bind_address: "127.0.0.1:4500".parse().unwrap(),
//!     max_connections: 16,
//!     write_timeout: Duration::from_secs(2),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Smallest accepted `max_line_length`; the longest valid command fits well below it
pub const MIN_LINE_LENGTH: usize = 64;

/// Server configuration options
///
/// # Fields
///
/// - `bind_address`: Address and port to listen on
/// - `max_connections`: Maximum concurrent connections
/// - `write_timeout`: How long a single batch of lines may take to write
/// - `max_line_length`: Longest request line accepted
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port to bind the TCP listener to
    ///
    /// # Default
    /// `0.0.0.0:4500` (all interfaces)
    ///
    /// # Examples
    /// - `0.0.0.0:4500` - Listen on all interfaces
    /// - `127.0.0.1:0` - Localhost on an ephemeral port (tests)
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    ///
    /// # Default
    /// 64 connections
    ///
    /// # Notes
    /// - Connections over the limit are closed right after accept
    /// - Counts sockets, not logged-in players
    pub max_connections: usize,

    /// Write timeout for one batch of response lines
    ///
    /// # Default
    /// 5 seconds
    ///
    /// # Notes
    /// - A timed-out write counts as a socket failure and ends the connection
    /// - Stops one stalled client from holding its event queues forever
    pub write_timeout: Duration,

    /// Longest request line, in bytes, before the line is rejected
    ///
    /// # Default
    /// 1024 bytes
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 4500)),
            max_connections: 64,
            write_timeout: Duration::from_secs(5),
            max_line_length: 1024,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    ///
    /// # Returns
    /// `Ok(())` if configuration is valid, `Err(String)` otherwise
    ///
    /// # Checks
    /// - `max_connections` must be > 0
    /// - `write_timeout` must be non-zero
    /// - `max_line_length` must be >= [`MIN_LINE_LENGTH`]
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }

        if self.write_timeout.is_zero() {
            return Err("write_timeout must be > 0".to_string());
        }

        if self.max_line_length < MIN_LINE_LENGTH {
            return Err(format!("max_line_length must be >= {}", MIN_LINE_LENGTH));
        }

        Ok(())
    }
}
