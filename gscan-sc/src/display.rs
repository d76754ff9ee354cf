//! Display surface contract and text rendering
//!
//! One surface renders every session state: the scanner prompt while idle, a
//! spinner while loading, the product card on success and the error message
//! on failure. Terminal states offer "scan again".

use crate::events::ScanEvent;
use crate::session::{ScanPhase, ScanState};
use gscan_common::{EcoScoreGrade, NutrientLevel, ProductInfo, ScoreColor};
use std::io::{self, Write};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Heading shown above the product card for each rating color
pub fn score_heading(color: ScoreColor) -> &'static str {
    match color {
        ScoreColor::Green => "Sustainable",
        ScoreColor::Yellow => "Partially Sustainable",
        ScoreColor::Red => "Not Sustainable",
        ScoreColor::Gray => "Not Available",
    }
}

/// Grade badge: upper-case letter, `NA` when unknown
pub fn grade_badge(grade: EcoScoreGrade) -> &'static str {
    match grade {
        EcoScoreGrade::A => "A",
        EcoScoreGrade::B => "B",
        EcoScoreGrade::C => "C",
        EcoScoreGrade::D => "D",
        EcoScoreGrade::E => "E",
        EcoScoreGrade::Unknown => "NA",
    }
}

/// Badge tone for a nutrient level
pub fn nutrient_badge_tone(level: NutrientLevel) -> ScoreColor {
    match level {
        NutrientLevel::Low => ScoreColor::Green,
        NutrientLevel::Moderate => ScoreColor::Yellow,
        NutrientLevel::High => ScoreColor::Red,
    }
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `saturated-fat` → `Saturated fat` (first hyphen only)
pub fn humanize_nutrient(key: &str) -> String {
    capitalize(&key.replacen('-', " ", 1))
}

/// `["en:milk", "en:nuts"]` → `Contains: Milk, Nuts`; `None` when empty
pub fn allergen_summary(allergens: &[String]) -> Option<String> {
    if allergens.is_empty() {
        return None;
    }
    let names: Vec<String> = allergens
        .iter()
        .map(|tag| capitalize(&tag.replacen("en:", "", 1)))
        .collect();
    Some(format!("Contains: {}", names.join(", ")))
}

/// Value placed on the clipboard by the "copy code" action
pub fn copy_code(product: &ProductInfo) -> &str {
    &product.barcode
}

/// Anything that can show the session to a user
pub trait DisplaySurface: Send {
    fn render(&mut self, state: &ScanState) -> io::Result<()>;
}

/// Plain-text surface over any writer
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_product(&mut self, product: &ProductInfo) -> io::Result<()> {
        let eco = &product.eco_score;
        writeln!(
            self.out,
            "[{}] {} ({})",
            grade_badge(eco.grade()),
            score_heading(eco.color()),
            eco.color()
        )?;
        writeln!(self.out, "{}", product.product_name)?;
        writeln!(self.out, "Brand: {}", product.brand)?;
        if let Some(quantity) = &product.quantity {
            writeln!(self.out, "Quantity: {}", quantity)?;
        }
        writeln!(self.out, "Barcode: {}", copy_code(product))?;

        if !product.nutrient_levels.is_empty() {
            let badges: Vec<String> = product
                .nutrient_levels
                .iter()
                .map(|(key, level)| {
                    format!(
                        "{}: {} ({})",
                        humanize_nutrient(key),
                        level.as_str(),
                        nutrient_badge_tone(*level)
                    )
                })
                .collect();
            writeln!(self.out, "Nutrient levels: {}", badges.join(" | "))?;
        }

        let per_100g: Vec<String> = product
            .nutriments
            .iter()
            .map(|(key, value)| format!("{} {}", humanize_nutrient(key), value))
            .collect();
        if !per_100g.is_empty() {
            writeln!(self.out, "Per 100g: {}", per_100g.join(", "))?;
        }

        if let Some(ingredients) = &product.ingredients_text {
            writeln!(self.out, "Ingredients: {}", ingredients)?;
        }
        if let Some(summary) = allergen_summary(&product.allergens) {
            writeln!(self.out, "Allergen alert! {}", summary)?;
        }
        Ok(())
    }
}

impl<W: Write + Send> DisplaySurface for TerminalDisplay<W> {
    fn render(&mut self, state: &ScanState) -> io::Result<()> {
        match state {
            ScanState::Idle => writeln!(self.out, "Ready to scan")?,
            ScanState::Loading { barcode, .. } => {
                writeln!(self.out, "Looking up {}...", barcode)?
            }
            ScanState::Result(product) => {
                self.render_product(product)?;
                writeln!(self.out, "Type 'again' to scan another product")?;
            }
            ScanState::Error(message) => {
                writeln!(self.out, "Error: {}", message)?;
                writeln!(self.out, "Type 'again' to try again")?;
            }
        }
        self.out.flush()
    }
}

/// Render every state published on `events` until `shutdown` fires
///
/// Subscribe before issuing any decode so that no transition is missed.
/// Events already queued when `shutdown` fires are still rendered. Returns
/// the surface once done.
pub async fn render_events<D: DisplaySurface>(
    mut display: D,
    mut events: broadcast::Receiver<ScanEvent>,
    shutdown: CancellationToken,
) -> D {
    loop {
        let event = tokio::select! {
            biased;
            event = events.recv() => event,
            _ = shutdown.cancelled() => break,
        };
        match event {
            Ok(event) => render_event(&mut display, event),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Display lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    display
}

/// The state each event leaves the session in, rendered
fn render_event<D: DisplaySurface>(display: &mut D, event: ScanEvent) {
    let state = match event {
        ScanEvent::StateChanged {
            new_state: ScanPhase::Idle,
            ..
        } => ScanState::Idle,
        ScanEvent::LookupStarted {
            lookup_id, barcode, ..
        } => ScanState::Loading { barcode, lookup_id },
        ScanEvent::ProductResolved { product, .. } => ScanState::Result(product),
        ScanEvent::LookupFailed { message, .. } => ScanState::Error(message),
        _ => return,
    };
    if let Err(e) = display.render(&state) {
        warn!("Failed to render state: {}", e);
    }
}
