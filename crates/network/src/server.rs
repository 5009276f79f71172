//! # GameServer - Main Server Implementation
//!
//! This module provides the listener that accepts player connections.
//!
//! # Architecture
//!
//! ## Components
//!
//! 1. **TCP Listener** - Accepts incoming connections
//! 2. **Connection Map** - Tracks open sockets (DashMap for concurrent access)
//! 3. **Dispatcher** - Shared by every connection; owns the world
//! 4. **ID Generator** - Assigns unique connection IDs
//!
//! Every accepted socket gets its own task running a [`PlayerConnection`].
//!
//! # Example
//!
//! ```rust,no_run
//! use gridhunt_network::{GameServer, ServerConfig};
//! # async fn demo(dispatcher: std::sync::Arc<gridhunt_game::Dispatcher>) -> gridhunt_core::Result<()> {
//! let config = ServerConfig {
//!     bind_address: "0.0.0.0:4500".parse().unwrap(),
//!     max_connections: 32,
//!     ..Default::default()
//! };
//!
//! let server = GameServer::new(config, dispatcher).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::ServerConfig, connection::PlayerConnection};
use dashmap::DashMap;
use gridhunt_core::{ConnectionId, GridError, IdGenerator, Result};
use gridhunt_game::Dispatcher;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Main server instance
///
/// # Shutdown
///
/// [`GameServer::run`] returns on Ctrl-C, [`GameServer::run_until`] when the
/// given future resolves. Online players are saved before returning; open
/// connections keep running until their clients leave or the runtime stops.
pub struct GameServer {
    config: ServerConfig,

    listener: TcpListener,

    /// Open sockets
    /// Key: ConnectionId, Value: peer address
    connections: Arc<DashMap<ConnectionId, SocketAddr>>,

    dispatcher: Arc<Dispatcher>,

    id_generator: IdGenerator,
}

impl GameServer {
    /// Create a new server instance
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration is invalid
    /// - TCP listener cannot be bound to the specified address
    pub async fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GridError::Config(format!("Invalid configuration: {}", e)))?;

        let listener = TcpListener::bind(config.bind_address).await.map_err(|e| {
            GridError::Network(format!("Failed to bind to {}: {}", config.bind_address, e))
        })?;

        tracing::info!("GameServer listening on {}", listener.local_addr()?);
        tracing::info!("Configuration: max_connections={}, write_timeout={:?}",
            config.max_connections, config.write_timeout);

        Ok(Self {
            config,
            listener,
            connections: Arc::new(DashMap::new()),
            dispatcher,
            id_generator: IdGenerator::new(),
        })
    }

    /// Address the listener is bound to (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Ctrl-C received, initiating shutdown");
        })
        .await
    }

    /// Run the accept loop until `shutdown` resolves
    ///
    /// # Lifecycle
    ///
    /// ```text
    /// 1. Accept incoming connection
    /// 2. Check connection limit
    /// 3. Assign connection ID
    /// 4. Spawn connection task
    /// 5. Repeat until shutdown
    /// ```
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("GameServer starting main loop");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((socket, addr)) => self.accept(socket, addr).await,
                        Err(e) => tracing::error!("Error accepting connection: {:?}", e),
                    }
                }

                _ = &mut shutdown => break,
            }
        }

        tracing::info!("GameServer main loop ended with {} open connections", self.connections.len());
        if let Err(e) = self.dispatcher.world().persist_all() {
            tracing::error!("Failed to save players at shutdown: {}", e);
        }
        Ok(())
    }

    async fn accept(&self, mut socket: tokio::net::TcpStream, addr: SocketAddr) {
        if self.connections.len() >= self.config.max_connections {
            tracing::warn!("Connection from {} rejected: server full ({} connections)",
                addr, self.connections.len());
            if let Err(e) = socket.shutdown().await {
                tracing::debug!("Shutdown of rejected {} failed: {}", addr, e);
            }
            return;
        }

        let id = ConnectionId::new(self.id_generator.next_id());
        self.connections.insert(id, addr);

        let conn = PlayerConnection::new(id, socket, addr, self.dispatcher.clone(), &self.config);
        let connections = self.connections.clone();

        tokio::spawn(async move {
            tracing::info!("Connection {} task started ({})", id.get(), addr);

            let result = conn.run().await;
            connections.remove(&id);

            match result {
                Ok(()) => tracing::info!("Connection {} task completed", id.get()),
                Err(e) => tracing::error!("Connection {} task failed: {:?}", id.get(), e),
            }
        });
    }

    /// Get the number of open connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[inline]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
