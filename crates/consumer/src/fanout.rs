//! Live fan-out to connected dashboard sessions.
//!
//! A broadcast channel with no backlog: listeners receive only events
//! broadcast while they are subscribed, late joiners simply miss earlier
//! events, and a listener that falls behind skips what it missed instead
//! of stalling the consume loop.

use relay_types::InboundEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct Fanout {
    tx: broadcast::Sender<InboundEvent>,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver an event to all currently-connected listeners, best-effort.
    /// Returns the number of listeners reached.
    pub fn broadcast(&self, event: InboundEvent) -> usize {
        // send only errors when there are no receivers, which is fine here
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InboundEvent> {
        self.tx.subscribe()
    }
}
