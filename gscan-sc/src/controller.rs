//! Scan session controller
//!
//! Wraps a [`ScanSession`] behind a mutex, issues lookups for accepted
//! decodes and publishes every transition on the [`EventBus`].
//!
//! Each accepted decode spawns one lookup task. The task races the lookup
//! against the session's cancellation token and the lookup timeout, then
//! reports back through [`ScanController::complete`] with its lookup id, so a
//! cancelled or superseded lookup can never overwrite a newer state.

use crate::devices::ScannerSettings;
use crate::events::{EventBus, ScanEvent};
use crate::lookup::{LookupFailure, ProductLookup};
use crate::session::{LookupTicket, ScanPhase, ScanSession, ScanState};
use chrono::Utc;
use gscan_common::ProductInfo;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Event bus capacity; rendering is fast, a handful of events per scan
const EVENT_CAPACITY: usize = 100;

struct InFlight {
    lookup_id: Uuid,
    cancel: CancellationToken,
}

struct Inner {
    session: ScanSession,
    in_flight: Option<InFlight>,
    device_id: Option<String>,
}

/// Drives one scan session
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ScanController {
    inner: Arc<Mutex<Inner>>,
    lookup: Arc<dyn ProductLookup>,
    events: EventBus,
    lookup_timeout: Duration,
}

impl ScanController {
    /// Controller in `Idle` with an optional camera preselected
    pub fn new(
        lookup: Arc<dyn ProductLookup>,
        lookup_timeout: Duration,
        device_id: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session: ScanSession::new(),
                in_flight: None,
                device_id: normalize_device_id(device_id),
            })),
            lookup,
            events: EventBus::new(EVENT_CAPACITY),
            lookup_timeout,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Number of live event subscribers
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> ScanState {
        self.inner.lock().await.session.state().clone()
    }

    /// Wait until no lookup is in flight and return the state reached
    ///
    /// Returns immediately unless the session is `Loading`. Bounded by the
    /// lookup timeout.
    pub async fn settled(&self) -> ScanState {
        // Subscribe before reading the state so no transition is missed
        let mut events = self.events.subscribe();
        loop {
            let state = self.state().await;
            if state.phase() != ScanPhase::Loading {
                return state;
            }
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return self.state().await,
            }
        }
    }

    /// Decode batch from the scanning surface
    ///
    /// Returns the id of the lookup issued, or `None` when the batch was
    /// ignored (session not idle, or a blank first value).
    pub async fn handle_decode<I, S>(&self, batch: I) -> Option<Uuid>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = batch
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();

        let mut inner = self.inner.lock().await;
        let old_state = inner.session.phase();

        let Some(ticket) = inner.session.on_decode(&values) else {
            if let Some(value) = values.into_iter().next() {
                debug!(value = %value, state = %old_state, "Decode ignored");
                self.events.emit_lossy(ScanEvent::DecodeIgnored {
                    value,
                    state: old_state,
                    timestamp: Utc::now(),
                });
            }
            return None;
        };

        info!(barcode = %ticket.barcode, lookup_id = %ticket.lookup_id, "Lookup started");

        let cancel = CancellationToken::new();
        inner.in_flight = Some(InFlight {
            lookup_id: ticket.lookup_id,
            cancel: cancel.clone(),
        });

        self.emit_state_change(old_state, ScanPhase::Loading);
        self.events.emit_lossy(ScanEvent::LookupStarted {
            lookup_id: ticket.lookup_id,
            barcode: ticket.barcode.clone(),
            timestamp: Utc::now(),
        });
        drop(inner);

        let lookup_id = ticket.lookup_id;
        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_lookup(ticket, cancel).await;
        });

        Some(lookup_id)
    }

    async fn run_lookup(self, ticket: LookupTicket, cancel: CancellationToken) {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(lookup_id = %ticket.lookup_id, "Lookup cancelled before completion");
                return;
            }
            result = tokio::time::timeout(self.lookup_timeout, self.lookup.lookup(&ticket.barcode)) => {
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => Err(LookupFailure::TimedOut),
                }
            }
        };

        if let Err(failure) = &outcome {
            warn!(barcode = %ticket.barcode, error = %failure, "Lookup failed");
        }

        self.complete(ticket.lookup_id, outcome.map_err(|e| e.to_string()))
            .await;
    }

    /// Apply a lookup outcome
    ///
    /// Discarded (returns `false`) unless the session is still loading
    /// `lookup_id`.
    pub async fn complete(&self, lookup_id: Uuid, outcome: Result<ProductInfo, String>) -> bool {
        let mut inner = self.inner.lock().await;
        let old_state = inner.session.phase();

        if !inner.session.complete(lookup_id, outcome) {
            debug!(lookup_id = %lookup_id, state = %old_state, "Stale lookup completion discarded");
            return false;
        }
        inner.in_flight = None;

        let event = match inner.session.state() {
            ScanState::Result(product) => {
                info!(
                    barcode = %product.barcode,
                    grade = %product.eco_score.grade(),
                    "Product resolved"
                );
                ScanEvent::ProductResolved {
                    lookup_id,
                    product: product.clone(),
                    timestamp: Utc::now(),
                }
            }
            state => ScanEvent::LookupFailed {
                lookup_id,
                message: state.error_message().unwrap_or_default().to_string(),
                timestamp: Utc::now(),
            },
        };

        self.emit_state_change(old_state, inner.session.phase());
        self.events.emit_lossy(event);
        true
    }

    /// `Result | Error` → `Idle`
    pub async fn scan_again(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let old_state = inner.session.phase();

        if !inner.session.scan_again() {
            debug!(state = %old_state, "Scan again ignored");
            return false;
        }

        self.emit_state_change(old_state, ScanPhase::Idle);
        true
    }

    /// Abandon the in-flight lookup, `Loading` → `Idle`
    pub async fn cancel(&self) -> bool {
        let mut inner = self.inner.lock().await;

        let Some(lookup_id) = inner.session.cancel() else {
            return false;
        };
        if let Some(in_flight) = inner.in_flight.take() {
            debug_assert_eq!(in_flight.lookup_id, lookup_id);
            in_flight.cancel.cancel();
        }

        info!(lookup_id = %lookup_id, "Lookup cancelled");
        self.events.emit_lossy(ScanEvent::LookupCancelled {
            lookup_id,
            timestamp: Utc::now(),
        });
        self.emit_state_change(ScanPhase::Loading, ScanPhase::Idle);
        true
    }

    /// Select a camera; `None` or a blank id selects the default camera
    pub async fn select_device(&self, device_id: Option<String>) {
        let device_id = normalize_device_id(device_id);
        info!(device_id = ?device_id, "Camera selected");
        self.inner.lock().await.device_id = device_id;
    }

    pub async fn device_id(&self) -> Option<String> {
        self.inner.lock().await.device_id.clone()
    }

    /// Settings for the scanning component under the current selection
    pub async fn scanner_settings(&self) -> ScannerSettings {
        ScannerSettings::for_device(self.inner.lock().await.device_id.as_deref())
    }

    fn emit_state_change(&self, old_state: ScanPhase, new_state: ScanPhase) {
        self.events.emit_lossy(ScanEvent::StateChanged {
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }
}

fn normalize_device_id(device_id: Option<String>) -> Option<String> {
    device_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
