//! # Connection Writer
//!
//! The write half of a player socket. The synchronous reply path and every
//! event queue of the player share one writer, so a batch of lines is
//! written under a single lock and never interleaves with another batch.
//!
//! A failed or timed-out write marks the connection disconnected and wakes
//! the connection's read loop, which then tears the connection down.

use async_trait::async_trait;
use futures::SinkExt;
use gridhunt_core::{GridError, Result};
use gridhunt_game::ResponseSink;
use gridhunt_protocol::Response;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex as TokioMutex, Notify};
use tokio_util::codec::{FramedWrite, LinesCodec};

pub struct ConnectionWriter {
    peer_addr: SocketAddr,

    /// Framed socket half (Tokio mutex, held across the write)
    frames: TokioMutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,

    write_timeout: Duration,

    disconnected: AtomicBool,

    /// Signalled once, on the first write failure
    failed: Notify,

    lines_sent: AtomicU64,
}

impl ConnectionWriter {
    pub fn new(half: OwnedWriteHalf, peer_addr: SocketAddr, write_timeout: Duration) -> Self {
        Self {
            peer_addr,
            frames: TokioMutex::new(FramedWrite::new(half, LinesCodec::new())),
            write_timeout,
            disconnected: AtomicBool::new(false),
            failed: Notify::new(),
            lines_sent: AtomicU64::new(0),
        }
    }

    /// Resolves after a write has failed
    ///
    /// The notification is stored if nobody is waiting yet, so a failure
    /// that happens between two waits is not lost.
    pub async fn failed(&self) {
        self.failed.notified().await;
    }

    /// Mark the socket unusable and wake the read loop
    pub fn mark_disconnected(&self) {
        if !self.disconnected.swap(true, Ordering::SeqCst) {
            tracing::debug!("Writer for {} marked disconnected", self.peer_addr);
            self.failed.notify_one();
        }
    }

    /// Refuse further writes and shut the socket's write side
    pub async fn close(&self) {
        self.disconnected.store(true, Ordering::SeqCst);

        let mut frames = self.frames.lock().await;
        if let Err(e) = frames.get_mut().shutdown().await {
            tracing::debug!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
    }

    /// Get the number of lines written so far
    pub fn lines_sent(&self) -> u64 {
        self.lines_sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResponseSink for ConnectionWriter {
    async fn send(&self, responses: &[Response]) -> Result<()> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(GridError::Network(format!("{} is disconnected", self.peer_addr)));
        }

        let mut frames = self.frames.lock().await;
        let write = async {
            for response in responses {
                frames.feed(response.to_line()).await?;
            }
            SinkExt::<String>::flush(&mut *frames).await
        };

        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(Ok(())) => {
                self.lines_sent.fetch_add(responses.len() as u64, Ordering::Relaxed);
                Ok(())
            }
            Ok(Err(e)) => {
                self.mark_disconnected();
                Err(GridError::Network(format!("write to {} failed: {}", self.peer_addr, e)))
            }
            Err(_) => {
                self.mark_disconnected();
                Err(GridError::Network(format!("write to {} timed out", self.peer_addr)))
            }
        }
    }
}
