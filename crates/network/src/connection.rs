//! # Player Connection Management
//!
//! This module handles individual TCP connections from game clients.
//!
//! # Architecture
//!
//! Each connection runs in its own Tokio task and owns:
//! - The read half of the socket, framed into lines
//! - A [`ConnectionWriter`] shared with the player's event queues
//! - One [`EventQueue`] per [`Subject`], registered at login
//!
//! The task reads a line, dispatches it and writes the result before
//! reading the next one. Events published by other players reach the socket
//! through the event queues, independently of this loop.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting → Authenticating → Active → Terminating
//!                    ↓                       ↑
//!                    └──── EOF / error ──────┘
//! ```
//!
//! A successful `quit`, end of stream, a read error or a failed write moves
//! the connection to `Terminating`. Leaving without `quit` runs the same
//! departure as `quit` minus the farewell line.

use crate::codec::RequestCodec;
use crate::config::ServerConfig;
use crate::writer::ConnectionWriter;
use futures::StreamExt;
use gridhunt_core::{ConnectionId, PlayerName, Result};
use gridhunt_game::{Dispatcher, EventQueue, Publication, ResponseSink, Subject, World};
use gridhunt_protocol::{Action, Command};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;

/// State of a player connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Socket accepted, loop not started
    Connecting,

    /// Reading commands, no player logged in yet
    Authenticating,

    /// A player is logged in on this connection
    Active,

    /// Connection is being closed (cleanup in progress)
    Terminating,
}

/// What the read loop does after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Individual player connection
///
/// # Example
///
/// ```rust,no_run
/// # use gridhunt_network::{PlayerConnection, ServerConfig};
/// # async fn demo(stream: tokio::net::TcpStream, dispatcher: std::sync::Arc<gridhunt_game::Dispatcher>) -> gridhunt_core::Result<()> {
/// let peer = stream.peer_addr()?;
/// let conn = PlayerConnection::new(gridhunt_core::ConnectionId::new(1), stream, peer, dispatcher, &ServerConfig::default());
/// conn.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct PlayerConnection {
    pub id: ConnectionId,

    pub peer_addr: SocketAddr,

    state: ConnectionState,

    /// Logged-in player; attached to every command read on this connection
    player: Option<PlayerName>,

    reader: FramedRead<OwnedReadHalf, RequestCodec>,

    writer: Arc<ConnectionWriter>,

    dispatcher: Arc<Dispatcher>,

    /// One queue per subject, present while a player is logged in
    queues: Vec<EventQueue>,
}

impl PlayerConnection {
    pub fn new(
        id: ConnectionId,
        socket: TcpStream,
        peer_addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        config: &ServerConfig,
    ) -> Self {
        tracing::debug!("New connection {}: {}", id.get(), peer_addr);

        if let Err(e) = socket.set_nodelay(true) {
            tracing::debug!("Connection {}: set_nodelay failed: {}", id.get(), e);
        }
        let (read_half, write_half) = socket.into_split();

        Self {
            id,
            peer_addr,
            state: ConnectionState::Connecting,
            player: None,
            reader: FramedRead::new(read_half, RequestCodec::new(config.max_line_length)),
            writer: Arc::new(ConnectionWriter::new(write_half, peer_addr, config.write_timeout)),
            dispatcher,
            queues: Vec::new(),
        }
    }

    /// Run the connection main loop until the connection terminates
    ///
    /// # Errors
    /// Socket failures end the loop but are logged rather than returned;
    /// the teardown always runs.
    pub async fn run(mut self) -> Result<()> {
        self.state = ConnectionState::Authenticating;
        tracing::info!("Connection {} starting main loop", self.id.get());

        let writer = self.writer.clone();
        loop {
            let line = tokio::select! {
                line = self.reader.next() => line,

                // An event queue write failed
                _ = writer.failed() => {
                    tracing::warn!("Connection {} lost during event delivery", self.id.get());
                    break;
                }
            };

            match line {
                Some(Ok(Ok(line))) => match self.handle_line(&line).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        tracing::warn!("Connection {} write error: {}", self.id.get(), e);
                        break;
                    }
                },
                // Rejected line; the connection stays open
                Some(Ok(Err(bad))) => {
                    tracing::debug!("Connection {} sent a bad line: {:?}", self.id.get(), bad);
                    if let Err(e) = self.writer.send(&[bad.reply()]).await {
                        tracing::warn!("Connection {} write error: {}", self.id.get(), e);
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("Connection {} read error: {}", self.id.get(), e);
                    break;
                }
                None => {
                    tracing::info!("Connection {} closed by client", self.id.get());
                    break;
                }
            }
        }

        self.cleanup().await;
        Ok(())
    }

    /// Dispatch one request line and answer it
    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let cmd = Command::parse(line, self.player.clone());
        let outcome = self.dispatcher.execute(&cmd);
        let succeeded = outcome.result.is_success();

        if succeeded && cmd.action == Action::Login {
            if let Some(name) = outcome.result.player.clone() {
                self.register_listeners(&name);
                self.player = Some(name);
                self.state = ConnectionState::Active;
            }
        }

        // Listeners are in place, so a new player sees its own arrival
        self.dispatcher.publish(outcome.publications);

        let flow = if succeeded && cmd.action == Action::Quit {
            // The quit handler already took the player out of the world
            self.player = None;
            self.state = ConnectionState::Terminating;
            self.stop_listeners().await;
            Flow::Quit
        } else {
            Flow::Continue
        };

        self.writer.send(&[outcome.result.to_response()]).await?;
        Ok(flow)
    }

    fn register_listeners(&mut self, name: &PlayerName) {
        let world = self.dispatcher.world();
        let sink: Arc<dyn ResponseSink> = self.writer.clone();

        for subject in Subject::ALL {
            let queue = EventQueue::new(name.clone(), sink.clone());
            world.events.subscribe(subject, name.clone(), Arc::new(queue.clone()));
            self.queues.push(queue);
        }
        tracing::debug!("Connection {}: {} listeners registered for {}", self.id.get(), self.queues.len(), name);
    }

    /// Stop every event queue, delivering what is already queued
    async fn stop_listeners(&mut self) {
        for queue in self.queues.drain(..) {
            queue.shutdown().await;
        }
    }

    /// Cleanup connection resources
    async fn cleanup(&mut self) {
        tracing::info!("Connection {} cleaning up (was {:?})", self.id.get(), self.state);
        self.state = ConnectionState::Terminating;

        // Left without quitting
        if let Some(name) = self.player.take() {
            let world: &World = self.dispatcher.world();
            if let Some(player) = world.depart(&name) {
                world.publish(Publication::Broadcast(World::departure_event(&player)));
            }
        }

        self.stop_listeners().await;
        self.writer.close().await;

        tracing::info!(
            "Connection {} stats - {} lines sent",
            self.id.get(),
            self.writer.lines_sent()
        );
    }
}
