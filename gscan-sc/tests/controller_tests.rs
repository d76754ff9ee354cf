//! Scan controller tests with an in-memory lookup
//!
//! Tests cover:
//! - One lookup per scan while the decoder repeats the same code
//! - Result and error paths, scan again
//! - Lookup timeout and cancellation (late completions discarded)
//! - Event sequence published to the display surface
//! - Display rendering of a scan issued before the renderer starts
//! - Camera selection

use async_trait::async_trait;
use gscan_common::{EcoScore, EcoScoreGrade, Nutriments, ProductInfo};
use gscan_sc::devices::FacingMode;
use gscan_sc::display::render_events;
use gscan_sc::{TerminalDisplay, LookupFailure, ProductLookup, ScanController, ScanEvent, ScanPhase, ScanState};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Lookup that records calls and optionally waits for the test to release it
struct FakeLookup {
    calls: AtomicUsize,
    barcodes: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
    failure: Option<LookupFailure>,
}

impl FakeLookup {
    fn instant() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            barcodes: Mutex::new(Vec::new()),
            gate: None,
            failure: None,
        })
    }

    fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            barcodes: Mutex::new(Vec::new()),
            gate: Some(gate),
            failure: None,
        })
    }

    fn failing(failure: LookupFailure) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            barcodes: Mutex::new(Vec::new()),
            gate: None,
            failure: Some(failure),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductLookup for FakeLookup {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.barcodes.lock().unwrap().push(barcode.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(product(barcode)),
        }
    }
}

fn product(barcode: &str) -> ProductInfo {
    ProductInfo {
        barcode: barcode.to_string(),
        product_name: "Nutella".to_string(),
        brand: "Ferrero".to_string(),
        quantity: Some("400 g".to_string()),
        image_url: None,
        ingredients_text: None,
        allergens: vec!["en:milk".to_string()],
        nutrient_levels: BTreeMap::new(),
        nutriments: Nutriments::default(),
        eco_score: EcoScore::from_grade(EcoScoreGrade::A),
    }
}

fn controller(lookup: Arc<FakeLookup>) -> ScanController {
    ScanController::new(lookup, Duration::from_secs(5), None)
}

/// Poll until the session reaches `phase`
async fn wait_for_phase(controller: &ScanController, phase: ScanPhase) -> ScanState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = controller.state().await;
            if state.phase() == phase {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session did not reach expected phase")
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_decode_resolves_product() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());

    let lookup_id = controller.handle_decode(["3017620422003"]).await;
    assert!(lookup_id.is_some());

    let state = wait_for_phase(&controller, ScanPhase::Result).await;
    let product = state.product().unwrap();
    assert_eq!(product.barcode, "3017620422003");
    assert_eq!(product.eco_score.color().as_str(), "green");
    assert!(!state.shows_scanner());
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_only_first_value_of_batch_looked_up() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());

    controller.handle_decode(["111", "222", "333"]).await;
    wait_for_phase(&controller, ScanPhase::Result).await;

    assert_eq!(*lookup.barcodes.lock().unwrap(), vec!["111".to_string()]);
}

// =============================================================================
// Debounce
// =============================================================================

#[tokio::test]
async fn test_repeated_decodes_while_loading_issue_one_lookup() {
    let gate = Arc::new(Notify::new());
    let lookup = FakeLookup::gated(gate.clone());
    let controller = controller(lookup.clone());

    assert!(controller.handle_decode(["3017620422003"]).await.is_some());
    for _ in 0..5 {
        assert!(controller.handle_decode(["3017620422003"]).await.is_none());
    }
    assert!(controller.handle_decode(["4006381333931"]).await.is_none());
    assert_eq!(controller.state().await.phase(), ScanPhase::Loading);

    gate.notify_one();
    let state = wait_for_phase(&controller, ScanPhase::Result).await;

    assert_eq!(state.product().unwrap().barcode, "3017620422003");
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_decode_in_terminal_state_ignored() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());

    controller.handle_decode(["111"]).await;
    wait_for_phase(&controller, ScanPhase::Result).await;

    assert!(controller.handle_decode(["222"]).await.is_none());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(controller.state().await.product().unwrap().barcode, "111");
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_blank_batch_ignored() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());

    assert!(controller.handle_decode(["", " "]).await.is_none());
    assert!(controller.handle_decode(Vec::<String>::new()).await.is_none());

    assert_eq!(controller.state().await, ScanState::Idle);
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn test_blank_first_value_ignores_whole_batch() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());
    let mut events = controller.subscribe();

    assert!(controller.handle_decode(["", "3017620422003"]).await.is_none());

    assert_eq!(controller.state().await, ScanState::Idle);
    assert_eq!(lookup.calls(), 0);
    match events.try_recv().unwrap() {
        ScanEvent::DecodeIgnored { value, state, .. } => {
            assert_eq!(value, "");
            assert_eq!(state, ScanPhase::Idle);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

// =============================================================================
// Failure, scan again
// =============================================================================

#[tokio::test]
async fn test_rejected_lookup_shows_proxy_message() {
    let lookup = FakeLookup::failing(LookupFailure::Rejected {
        status: 404,
        message: "Product not found".to_string(),
    });
    let controller = controller(lookup);

    controller.handle_decode(["0000000000000"]).await;
    let state = wait_for_phase(&controller, ScanPhase::Error).await;

    assert_eq!(state.error_message(), Some("Product not found"));
}

#[tokio::test]
async fn test_scan_again_clears_result_and_allows_new_lookup() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup.clone());

    controller.handle_decode(["111"]).await;
    wait_for_phase(&controller, ScanPhase::Result).await;

    assert!(controller.scan_again().await);
    assert_eq!(controller.state().await, ScanState::Idle);

    controller.handle_decode(["222"]).await;
    let state = wait_for_phase(&controller, ScanPhase::Result).await;
    assert_eq!(state.product().unwrap().barcode, "222");
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn test_scan_again_clears_error() {
    let lookup = FakeLookup::failing(LookupFailure::Transport("connection refused".to_string()));
    let controller = controller(lookup);

    controller.handle_decode(["111"]).await;
    wait_for_phase(&controller, ScanPhase::Error).await;

    assert!(controller.scan_again().await);
    let state = controller.state().await;
    assert_eq!(state, ScanState::Idle);
    assert!(state.error_message().is_none());
    assert!(state.shows_scanner());
}

#[tokio::test]
async fn test_scan_again_while_loading_ignored() {
    let gate = Arc::new(Notify::new());
    let controller = controller(FakeLookup::gated(gate.clone()));

    controller.handle_decode(["111"]).await;
    assert!(!controller.scan_again().await);
    assert_eq!(controller.state().await.phase(), ScanPhase::Loading);

    gate.notify_one();
    wait_for_phase(&controller, ScanPhase::Result).await;
}

// =============================================================================
// Timeout and cancellation
// =============================================================================

#[tokio::test]
async fn test_lookup_timeout_becomes_error() {
    // Never released
    let gate = Arc::new(Notify::new());
    let controller = ScanController::new(
        FakeLookup::gated(gate),
        Duration::from_millis(100),
        None,
    );

    controller.handle_decode(["111"]).await;
    let state = wait_for_phase(&controller, ScanPhase::Error).await;

    assert_eq!(state.error_message(), Some("Lookup timed out"));
}

#[tokio::test]
async fn test_cancel_returns_to_idle_and_discards_late_result() {
    let gate = Arc::new(Notify::new());
    let lookup = FakeLookup::gated(gate.clone());
    let controller = controller(lookup.clone());

    let first = controller.handle_decode(["111"]).await.unwrap();
    assert!(controller.cancel().await);
    assert_eq!(controller.state().await, ScanState::Idle);

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.state().await, ScanState::Idle);

    // Completion for the abandoned id is stale
    assert!(!controller.complete(first, Ok(product("111"))).await);
    assert_eq!(controller.state().await, ScanState::Idle);
}

#[tokio::test]
async fn test_cancel_outside_loading_ignored() {
    let controller = controller(FakeLookup::instant());
    assert!(!controller.cancel().await);

    controller.handle_decode(["111"]).await;
    wait_for_phase(&controller, ScanPhase::Result).await;
    assert!(!controller.cancel().await);
    assert_eq!(controller.state().await.phase(), ScanPhase::Result);
}

#[tokio::test]
async fn test_new_scan_after_cancel_gets_new_lookup() {
    let gate = Arc::new(Notify::new());
    let lookup = FakeLookup::gated(gate.clone());
    let controller = controller(lookup.clone());

    let first = controller.handle_decode(["111"]).await.unwrap();
    controller.cancel().await;
    let second = controller.handle_decode(["222"]).await.unwrap();
    assert_ne!(first, second);

    assert!(!controller.complete(first, Ok(product("111"))).await);
    assert!(controller.complete(second, Ok(product("222"))).await);
    assert_eq!(controller.state().await.product().unwrap().barcode, "222");
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_event_sequence_for_successful_scan() {
    let lookup = FakeLookup::instant();
    let controller = controller(lookup);
    let mut events = controller.subscribe();

    let lookup_id = controller.handle_decode(["3017620422003"]).await.unwrap();
    wait_for_phase(&controller, ScanPhase::Result).await;

    match events.recv().await.unwrap() {
        ScanEvent::StateChanged { old_state, new_state, .. } => {
            assert_eq!(old_state, ScanPhase::Idle);
            assert_eq!(new_state, ScanPhase::Loading);
        }
        other => panic!("unexpected event {:?}", other),
    }
    match events.recv().await.unwrap() {
        ScanEvent::LookupStarted { lookup_id: id, barcode, .. } => {
            assert_eq!(id, lookup_id);
            assert_eq!(barcode, "3017620422003");
        }
        other => panic!("unexpected event {:?}", other),
    }
    match events.recv().await.unwrap() {
        ScanEvent::StateChanged { old_state, new_state, .. } => {
            assert_eq!(old_state, ScanPhase::Loading);
            assert_eq!(new_state, ScanPhase::Result);
        }
        other => panic!("unexpected event {:?}", other),
    }
    match events.recv().await.unwrap() {
        ScanEvent::ProductResolved { lookup_id: id, product, .. } => {
            assert_eq!(id, lookup_id);
            assert_eq!(product.barcode, "3017620422003");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_ignored_decode_and_cancel_are_published() {
    let gate = Arc::new(Notify::new());
    let controller = controller(FakeLookup::gated(gate));
    let mut events = controller.subscribe();

    let lookup_id = controller.handle_decode(["111"]).await.unwrap();
    controller.handle_decode(["111"]).await;
    controller.cancel().await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert!(seen.iter().any(|e| matches!(
        e,
        ScanEvent::DecodeIgnored { value, state: ScanPhase::Loading, .. } if value == "111"
    )));
    assert!(seen
        .iter()
        .any(|e| matches!(e, ScanEvent::LookupCancelled { lookup_id: id, .. } if *id == lookup_id)));
    assert!(matches!(
        seen.last(),
        Some(ScanEvent::StateChanged {
            old_state: ScanPhase::Loading,
            new_state: ScanPhase::Idle,
            ..
        })
    ));
}

// =============================================================================
// Display
// =============================================================================

#[tokio::test]
async fn test_settled_returns_immediately_outside_loading() {
    let controller = controller(FakeLookup::instant());

    let state = tokio::time::timeout(Duration::from_secs(1), controller.settled())
        .await
        .expect("settled blocked while idle");

    assert_eq!(state, ScanState::Idle);
}

#[tokio::test]
async fn test_settled_waits_for_lookup_in_flight() {
    let gate = Arc::new(Notify::new());
    let controller = controller(FakeLookup::gated(gate.clone()));

    controller.handle_decode(["111"]).await;
    let waiter = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.settled().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    gate.notify_one();
    let state = tokio::time::timeout(Duration::from_secs(2), waiter)
        .await
        .expect("settled did not return")
        .unwrap();
    assert_eq!(state.product().unwrap().barcode, "111");
}

#[tokio::test]
async fn test_renderer_shows_scan_issued_before_it_starts() {
    let controller = controller(FakeLookup::instant());
    let events = controller.subscribe();
    assert_eq!(controller.subscriber_count(), 1);

    // Decode and finish the lookup before the renderer task exists
    controller.handle_decode(["3017620422003"]).await;
    assert_eq!(controller.settled().await.phase(), ScanPhase::Result);

    // Shutdown already requested: queued events must still be drawn
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let display = render_events(TerminalDisplay::new(Vec::new()), events, shutdown).await;
    let text = String::from_utf8(display.into_inner()).unwrap();

    let loading = text.find("Looking up 3017620422003...").unwrap();
    let card = text.find("[A] Sustainable (green)").unwrap();
    assert!(loading < card);
    assert!(text.contains("Type 'again' to scan another product"));
}

#[tokio::test]
async fn test_renderer_shows_error_and_return_to_idle() {
    let lookup = FakeLookup::failing(LookupFailure::Rejected {
        status: 404,
        message: "Product not found".to_string(),
    });
    let controller = controller(lookup);
    let events = controller.subscribe();

    controller.handle_decode(["0000000000000"]).await;
    controller.settled().await;
    controller.scan_again().await;

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let display = render_events(TerminalDisplay::new(Vec::new()), events, shutdown).await;
    let text = String::from_utf8(display.into_inner()).unwrap();

    let error = text.find("Error: Product not found").unwrap();
    let ready = text.rfind("Ready to scan").unwrap();
    assert!(error < ready);
}

// =============================================================================
// Camera selection
// =============================================================================

#[tokio::test]
async fn test_default_camera_faces_environment() {
    let controller = controller(FakeLookup::instant());

    let settings = controller.scanner_settings().await;

    assert_eq!(settings.constraints.device_id, None);
    assert_eq!(settings.constraints.facing_mode, Some(FacingMode::Environment));
    assert!(!settings.allow_multiple);
}

#[tokio::test]
async fn test_selected_camera_requested_by_id() {
    let controller = controller(FakeLookup::instant());

    controller.select_device(Some("cam-1".to_string())).await;
    let settings = controller.scanner_settings().await;
    assert_eq!(settings.constraints.device_id.as_deref(), Some("cam-1"));
    assert_eq!(settings.constraints.facing_mode, None);

    controller.select_device(Some("  ".to_string())).await;
    assert_eq!(controller.device_id().await, None);
    assert_eq!(
        controller.scanner_settings().await.constraints.facing_mode,
        Some(FacingMode::Environment)
    );
}

#[tokio::test]
async fn test_preselected_camera() {
    let controller = ScanController::new(
        FakeLookup::instant(),
        Duration::from_secs(5),
        Some("usb-cam".to_string()),
    );
    assert_eq!(controller.device_id().await.as_deref(), Some("usb-cam"));
}
