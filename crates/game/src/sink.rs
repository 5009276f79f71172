//! Output channel of a connection

use async_trait::async_trait;
use gridhunt_core::Result;
use gridhunt_protocol::Response;

/// Where a connection's response lines go
///
/// Implemented by the socket writer of each connection. Both the synchronous
/// command loop and the connection's event queue workers write through the
/// same sink, so implementations must write a batch without interleaving
/// lines from another batch.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Write `responses` in order as one uninterrupted batch
    ///
    /// # Errors
    /// Any write failure. After the first failure the sink counts as
    /// disconnected and every later call fails too.
    async fn send(&self, responses: &[Response]) -> Result<()>;
}
