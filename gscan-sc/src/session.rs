//! Scan session state machine
//!
//! ```text
//! Idle --decode--> Loading --success--> Result --scan again--> Idle
//!                     |    --failure--> Error  --scan again--> Idle
//!                     +----cancel-----> Idle
//! ```
//!
//! Decode events are accepted only in `Idle`. A continuous video-frame
//! detector reports the same code on several consecutive frames; every event
//! after the first lands in `Loading` (or a terminal state) and is ignored,
//! so exactly one lookup is issued per scan.
//!
//! Completions carry the lookup id issued on entry to `Loading`. A completion
//! for any other id (cancelled, or from before a scan-again) is discarded.

use gscan_common::ProductInfo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse state, used in events and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Loading,
    Result,
    Error,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "idle"),
            ScanPhase::Loading => write!(f, "loading"),
            ScanPhase::Result => write!(f, "result"),
            ScanPhase::Error => write!(f, "error"),
        }
    }
}

/// Full session state
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// Camera active, awaiting a decode
    Idle,
    /// Lookup in flight
    Loading { barcode: String, lookup_id: Uuid },
    /// Terminal: product resolved
    Result(Box<ProductInfo>),
    /// Terminal: display message
    Error(String),
}

impl ScanState {
    pub fn phase(&self) -> ScanPhase {
        match self {
            ScanState::Idle => ScanPhase::Idle,
            ScanState::Loading { .. } => ScanPhase::Loading,
            ScanState::Result(_) => ScanPhase::Result,
            ScanState::Error(_) => ScanPhase::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Result(_) | ScanState::Error(_))
    }

    /// The scanning surface is shown only while idle
    pub fn shows_scanner(&self) -> bool {
        matches!(self, ScanState::Idle)
    }

    pub fn product(&self) -> Option<&ProductInfo> {
        match self {
            ScanState::Result(product) => Some(&**product),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ScanState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Lookup to issue after a decode was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub lookup_id: Uuid,
    pub barcode: String,
}

/// Scan session state machine (no I/O)
#[derive(Debug)]
pub struct ScanSession {
    state: ScanState,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn phase(&self) -> ScanPhase {
        self.state.phase()
    }

    /// Decode batch from the scanning surface
    ///
    /// Only the first value is considered, and only in `Idle`. A blank first
    /// value means the batch is ignored.
    /// Returns the lookup to issue, or `None` when the event is ignored.
    pub fn on_decode<I, S>(&mut self, batch: I) -> Option<LookupTicket>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !matches!(self.state, ScanState::Idle) {
            return None;
        }

        let first = batch.into_iter().next()?;
        let barcode = first.as_ref().trim();
        if barcode.is_empty() {
            return None;
        }
        let barcode = barcode.to_string();

        let lookup_id = Uuid::new_v4();
        self.state = ScanState::Loading {
            barcode: barcode.clone(),
            lookup_id,
        };

        Some(LookupTicket { lookup_id, barcode })
    }

    /// Lookup outcome for `lookup_id`
    ///
    /// Returns `false` (state unchanged) unless the session is `Loading` that
    /// same lookup.
    pub fn complete(&mut self, lookup_id: Uuid, outcome: Result<ProductInfo, String>) -> bool {
        match &self.state {
            ScanState::Loading { lookup_id: current, .. } if *current == lookup_id => {}
            _ => return false,
        }

        self.state = match outcome {
            Ok(product) => ScanState::Result(Box::new(product)),
            Err(message) => ScanState::Error(message),
        };
        true
    }

    /// `Result | Error` → `Idle`, clearing the held value
    pub fn scan_again(&mut self) -> bool {
        if !self.state.is_terminal() {
            return false;
        }
        self.state = ScanState::Idle;
        true
    }

    /// `Loading` → `Idle`; returns the abandoned lookup id
    pub fn cancel(&mut self) -> Option<Uuid> {
        match self.state {
            ScanState::Loading { lookup_id, .. } => {
                self.state = ScanState::Idle;
                Some(lookup_id)
            }
            _ => None,
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}
