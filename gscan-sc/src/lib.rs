//! gscan-sc library - Scan Session Controller
//!
//! Turns decode events from a camera scanner into exactly one product lookup
//! per scan and exposes the resulting state to a display surface.

pub mod client;
pub mod config;
pub mod controller;
pub mod devices;
pub mod display;
pub mod events;
pub mod lookup;
pub mod session;

pub use crate::client::ProxyClient;
pub use crate::controller::ScanController;
pub use crate::devices::{CameraDevice, ScannerSettings, VideoConstraints};
pub use crate::display::{DisplaySurface, TerminalDisplay};
pub use crate::events::{EventBus, ScanEvent};
pub use crate::lookup::{LookupFailure, ProductLookup};
pub use crate::session::{ScanPhase, ScanSession, ScanState};
