//! Message transport seam.
//!
//! The mandate core only needs bytes carried faithfully between the two
//! parties. [`ChannelTransport`] is an in-process pair for tests and
//! single-binary deployments; network transports implement the same trait.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};

use crate::error::{MandateError, MandateResult};

#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, message: Bytes) -> MandateResult<()>;

    /// Next message, or `None` once the peer has hung up.
    async fn receive(&self) -> MandateResult<Option<Bytes>>;
}

/// One end of an in-process duplex channel.
#[derive(Debug)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Bytes>,
    rx: Mutex<mpsc::Receiver<Bytes>>,
}

impl ChannelTransport {
    /// Two connected ends with the given per-direction buffer.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (
            Self {
                tx: a_tx,
                rx: Mutex::new(a_rx),
            },
            Self {
                tx: b_tx,
                rx: Mutex::new(b_rx),
            },
        )
    }
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn send(&self, message: Bytes) -> MandateResult<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| MandateError::Transport {
                reason: "peer closed the channel".to_string(),
            })
    }

    async fn receive(&self) -> MandateResult<Option<Bytes>> {
        Ok(self.rx.lock().await.recv().await)
    }
}
