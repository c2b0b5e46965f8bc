use tokio::sync::broadcast;

use savvy_types::events::LedgerEvent;

/// A slow consumer can fall this far behind before it starts losing frames.
/// Lost frames are fine: clients refetch the full ledger on reconnect.
const CHANNEL_CAPACITY: usize = 1024;

/// Owns the set of live client channels. Consumers of the hub only get
/// `broadcast`; membership is managed by each connection subscribing on join
/// and dropping its receiver on close, so nothing outside the connection
/// tasks ever touches the set.
#[derive(Clone)]
pub struct Hub {
    tx: broadcast::Sender<LedgerEvent>,
}

impl Hub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Join: hands the caller its own receiver. Leaving is dropping it.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.tx.subscribe()
    }

    /// Enqueue a frame to every open channel and return without awaiting
    /// acknowledgement. Per-receiver delivery order matches broadcast-call
    /// order. The send error (no receivers) is not a failure.
    pub fn broadcast(&self, event: LedgerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn connected(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
