use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::StreamCfg;
use crate::errors::StreamError;

/// One discrete push message with its channel tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportMessage {
    pub channel: String,
    pub data: String,
}

/// Lifecycle and payload signals emitted by a live connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportSignal {
    /// The connection is established and the server accepted the stream.
    Opened,
    Message(TransportMessage),
    /// The connection failed or the server closed it; no further signals
    /// follow. The engine never retries on its own.
    Failed(String),
}

/// Handle to one live push connection: a signal stream plus deterministic
/// close. Closing (or dropping) the handle cancels the producer side, which
/// releases the underlying connection resource.
#[derive(Debug)]
pub struct TransportConn {
    signals: mpsc::Receiver<TransportSignal>,
    cancel: CancellationToken,
}

impl TransportConn {
    pub fn new(signals: mpsc::Receiver<TransportSignal>, cancel: CancellationToken) -> Self {
        Self { signals, cancel }
    }

    pub async fn recv(&mut self) -> Option<TransportSignal> {
        self.signals.recv().await
    }

    /// Token observed by the producer; cancelling it closes the connection.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for TransportConn {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Capability seam for the push connection.
///
/// Any transport satisfies it: the real SSE client, a polling fallback, or
/// a scripted test double, which keeps the connection state machine
/// testable without a network.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(&self, cfg: &StreamCfg) -> Result<TransportConn, StreamError>;
}
