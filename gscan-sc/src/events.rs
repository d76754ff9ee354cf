//! Scan session events and the bus that distributes them
//!
//! The display surface subscribes to the bus and renders every state change.

use crate::session::ScanPhase;
use chrono::{DateTime, Utc};
use gscan_common::ProductInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Scan session event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// Session moved between phases
    StateChanged {
        old_state: ScanPhase,
        new_state: ScanPhase,
        timestamp: DateTime<Utc>,
    },

    /// Decode accepted, lookup issued
    LookupStarted {
        lookup_id: Uuid,
        barcode: String,
        timestamp: DateTime<Utc>,
    },

    /// Lookup succeeded; session is in `Result`
    ProductResolved {
        lookup_id: Uuid,
        product: Box<ProductInfo>,
        timestamp: DateTime<Utc>,
    },

    /// Lookup failed; session is in `Error`
    LookupFailed {
        lookup_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Lookup abandoned before completion
    LookupCancelled {
        lookup_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Decode event dropped because the session was not idle
    DecodeIgnored {
        value: String,
        state: ScanPhase,
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`ScanEvent`]s
///
/// Publishing never blocks; slow subscribers see `Lagged` instead of
/// stalling the controller.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    /// Emit, ignoring the case where nobody is listening
    pub fn emit_lossy(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
