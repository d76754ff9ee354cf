//! Eco-score grade to sustainability rating
//!
//! The grade letter comes verbatim from the product database. Label and color
//! are derived from it and never stored independently: an [`EcoScore`] can
//! only be built from a grade.

use serde::{Deserialize, Serialize};

/// Eco-score grade as reported by the product database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EcoScoreGrade {
    A,
    B,
    C,
    D,
    E,
    /// Absent, empty, "unknown", "not-applicable" or anything unrecognized
    Unknown,
}

impl EcoScoreGrade {
    /// Parse an upstream grade string
    ///
    /// Taken verbatim: only the exact letters `a`..`e` are grades, every other
    /// value (including `"A"`) maps to [`EcoScoreGrade::Unknown`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("a") => EcoScoreGrade::A,
            Some("b") => EcoScoreGrade::B,
            Some("c") => EcoScoreGrade::C,
            Some("d") => EcoScoreGrade::D,
            Some("e") => EcoScoreGrade::E,
            _ => EcoScoreGrade::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcoScoreGrade::A => "a",
            EcoScoreGrade::B => "b",
            EcoScoreGrade::C => "c",
            EcoScoreGrade::D => "d",
            EcoScoreGrade::E => "e",
            EcoScoreGrade::Unknown => "unknown",
        }
    }
}

impl From<String> for EcoScoreGrade {
    fn from(raw: String) -> Self {
        EcoScoreGrade::parse(Some(&raw))
    }
}

impl std::fmt::Display for EcoScoreGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable sustainability label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcoScoreLabel {
    #[serde(rename = "Sustainable")]
    Sustainable,
    #[serde(rename = "Partially Sustainable")]
    PartiallySustainable,
    #[serde(rename = "Not Sustainable")]
    NotSustainable,
    #[serde(rename = "Not Available")]
    NotAvailable,
}

impl EcoScoreLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcoScoreLabel::Sustainable => "Sustainable",
            EcoScoreLabel::PartiallySustainable => "Partially Sustainable",
            EcoScoreLabel::NotSustainable => "Not Sustainable",
            EcoScoreLabel::NotAvailable => "Not Available",
        }
    }
}

impl std::fmt::Display for EcoScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display color of the sustainability rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl ScoreColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreColor::Green => "green",
            ScoreColor::Yellow => "yellow",
            ScoreColor::Red => "red",
            ScoreColor::Gray => "gray",
        }
    }
}

impl std::fmt::Display for ScoreColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade → (label, color)
///
/// a/b and d/e are grouped; everything else is "Not Available"/gray.
pub fn rate(grade: EcoScoreGrade) -> (EcoScoreLabel, ScoreColor) {
    match grade {
        EcoScoreGrade::A | EcoScoreGrade::B => (EcoScoreLabel::Sustainable, ScoreColor::Green),
        EcoScoreGrade::C => (EcoScoreLabel::PartiallySustainable, ScoreColor::Yellow),
        EcoScoreGrade::D | EcoScoreGrade::E => (EcoScoreLabel::NotSustainable, ScoreColor::Red),
        EcoScoreGrade::Unknown => (EcoScoreLabel::NotAvailable, ScoreColor::Gray),
    }
}

/// Grade together with its derived label and color
///
/// Serialized as the `ecoScoreGrade`, `ecoScoreLabel` and `color` fields of a
/// product. Deserializing reads the grade only and derives the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EcoScoreWire")]
pub struct EcoScore {
    #[serde(rename = "ecoScoreGrade")]
    grade: EcoScoreGrade,
    #[serde(rename = "ecoScoreLabel")]
    label: EcoScoreLabel,
    color: ScoreColor,
}

impl EcoScore {
    pub fn from_grade(grade: EcoScoreGrade) -> Self {
        let (label, color) = rate(grade);
        Self {
            grade,
            label,
            color,
        }
    }

    pub fn grade(&self) -> EcoScoreGrade {
        self.grade
    }

    pub fn label(&self) -> EcoScoreLabel {
        self.label
    }

    pub fn color(&self) -> ScoreColor {
        self.color
    }
}

impl Default for EcoScore {
    fn default() -> Self {
        Self::from_grade(EcoScoreGrade::Unknown)
    }
}

#[derive(Deserialize)]
struct EcoScoreWire {
    #[serde(rename = "ecoScoreGrade", default)]
    grade: Option<String>,
}

impl From<EcoScoreWire> for EcoScore {
    fn from(wire: EcoScoreWire) -> Self {
        EcoScore::from_grade(EcoScoreGrade::parse(wire.grade.as_deref()))
    }
}
