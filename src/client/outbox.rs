//! Module `outbox`
//!
//! Maps each live connection to the sending side of its outbound payload
//! queue. A connection's writer task drains the queue and ends once the
//! entry is detached.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::protocol::Payload;
use crate::registry::ConnectionHandle;

pub type PayloadReceiver = mpsc::UnboundedReceiver<Payload>;

/// Shared table of outbound queues, one per live connection.
#[derive(Clone, Default)]
pub struct Outbox {
    senders: Arc<Mutex<HashMap<ConnectionHandle, mpsc::UnboundedSender<Payload>>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a queue for `handle` unless `limit` connections are already
    /// attached.
    pub async fn try_attach(&self, handle: ConnectionHandle, limit: usize) -> Option<PayloadReceiver> {
        let mut senders = self.senders.lock().await;
        if senders.len() >= limit {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        senders.insert(handle, tx);
        Some(rx)
    }

    /// Drops the queue for `handle`. Payloads already queued are still
    /// drained by the writer.
    pub async fn detach(&self, handle: ConnectionHandle) {
        self.senders.lock().await.remove(&handle);
    }

    /// Queues `payload` for `handle`. Returns `false` if the connection is
    /// gone.
    pub async fn deliver(&self, handle: ConnectionHandle, payload: Payload) -> bool {
        match self.senders.lock().await.get(&handle) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.senders.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
