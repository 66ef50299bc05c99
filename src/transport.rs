//! Text-message connections.
//!
//! The handshake and the serve loop only need to exchange text frames with
//! a client. [`Transport`] captures that, so the same code drives a browser
//! WebSocket in production and an in-memory pipe in tests.

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::PlaygroundError;
use crate::Result;

/// A bidirectional stream of text frames.
pub trait Transport: Send {
    /// Send one frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next frame. `Ok(None)` means the peer closed cleanly.
    fn recv_text(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// One end of an in-memory connection.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Create two connected in-memory ends.
///
/// Dropping one end closes the connection for the other.
pub fn memory_pair() -> (MemoryTransport, MemoryTransport) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        MemoryTransport { tx: a_tx, rx: a_rx },
        MemoryTransport { tx: b_tx, rx: b_rx },
    )
}

impl Transport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.tx
            .send(text)
            .map_err(|_| PlaygroundError::ConnectionClosed)
    }

    async fn recv_text(&mut self) -> Result<Option<String>> {
        Ok(self.rx.recv().await)
    }
}
