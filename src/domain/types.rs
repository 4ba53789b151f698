//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the form hosts and the predictor
//! - printed as JSON by `titre predict --json`

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Acid grade whose titre is estimated.
///
/// Each grade has its own independently fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Grade {
    #[serde(rename = "29")]
    #[value(name = "29")]
    G29,
    #[serde(rename = "54")]
    #[value(name = "54")]
    G54,
}

impl Grade {
    pub const ALL: [Grade; 2] = [Grade::G29, Grade::G54];

    /// Label used on result cards (`Titre 29%`).
    pub fn label(self) -> &'static str {
        match self {
            Grade::G29 => "Titre 29%",
            Grade::G54 => "Titre 54%",
        }
    }

    /// The other grade (the form only ever shows one).
    pub fn toggle(self) -> Self {
        match self {
            Grade::G29 => Grade::G54,
            Grade::G54 => Grade::G29,
        }
    }

    /// Parse `29`, `29%`, `54` or `54%` (surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_end_matches('%') {
            "29" => Some(Grade::G29),
            "54" => Some(Grade::G54),
            _ => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::G29 => f.write_str("29"),
            Grade::G54 => f.write_str("54"),
        }
    }
}

/// The two measured values a prediction is made from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementInput {
    /// Measured density (kg/m³).
    pub density: f64,
    /// Measured TS (%).
    pub ts: f64,
}

impl MeasurementInput {
    pub fn new(density: f64, ts: f64) -> Self {
        Self { density, ts }
    }
}

impl Default for MeasurementInput {
    fn default() -> Self {
        InputBounds::STANDARD.defaults()
    }
}

/// A single evaluated titre. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub grade: Grade,
    pub label: &'static str,
    pub density: f64,
    pub ts: f64,
    /// Estimated titre (%).
    pub value: f64,
}

/// Which measured field a range note refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Density,
    Ts,
}

impl Field {
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Density => "density",
            Field::Ts => "TS",
        }
    }
}

/// Advisory note for a value outside the suggested input range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeNote {
    pub field: Field,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for RangeNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} is outside the suggested range [{}, {}]; the estimate is extrapolated.",
            self.field.display_name(),
            self.value,
            self.min,
            self.max
        )
    }
}

/// Suggested input ranges, defaults and step sizes for the form hosts.
///
/// This is presentation policy: nothing here is enforced by the predictor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputBounds {
    pub density_min: f64,
    pub density_max: f64,
    pub density_default: f64,
    pub density_step: f64,
    pub ts_min: f64,
    pub ts_max: f64,
    pub ts_default: f64,
    pub ts_step: f64,
}

impl InputBounds {
    pub const STANDARD: InputBounds = InputBounds {
        density_min: 1220.0,
        density_max: 1700.0,
        density_default: 1290.0,
        density_step: 1.0,
        ts_min: 0.0,
        ts_max: 100.0,
        ts_default: 0.9,
        ts_step: 0.01,
    };

    pub fn defaults(&self) -> MeasurementInput {
        MeasurementInput::new(self.density_default, self.ts_default)
    }

    /// Return a note for every field outside its suggested range.
    ///
    /// NaN is reported as out of range.
    pub fn check(&self, input: &MeasurementInput) -> Vec<RangeNote> {
        let mut notes = Vec::new();
        if !(self.density_min..=self.density_max).contains(&input.density) {
            notes.push(RangeNote {
                field: Field::Density,
                value: input.density,
                min: self.density_min,
                max: self.density_max,
            });
        }
        if !(self.ts_min..=self.ts_max).contains(&input.ts) {
            notes.push(RangeNote {
                field: Field::Ts,
                value: input.ts,
                min: self.ts_min,
                max: self.ts_max,
            });
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parse_accepts_percent_suffix() {
        assert_eq!(Grade::parse("29"), Some(Grade::G29));
        assert_eq!(Grade::parse(" 54% "), Some(Grade::G54));
        assert_eq!(Grade::parse("30"), None);
        assert_eq!(Grade::parse(""), None);
    }

    #[test]
    fn grade_toggle_round_trips() {
        for g in Grade::ALL {
            assert_eq!(g.toggle().toggle(), g);
            assert_ne!(g.toggle(), g);
        }
    }

    #[test]
    fn default_input_matches_form_defaults() {
        let input = MeasurementInput::default();
        assert_eq!(input.density, 1290.0);
        assert_eq!(input.ts, 0.9);
    }

    #[test]
    fn check_flags_each_out_of_range_field() {
        let bounds = InputBounds::STANDARD;
        assert!(bounds.check(&MeasurementInput::new(1290.0, 0.9)).is_empty());
        assert!(bounds.check(&MeasurementInput::new(1220.0, 100.0)).is_empty());

        let notes = bounds.check(&MeasurementInput::new(1000.0, 0.9));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::Density);

        let notes = bounds.check(&MeasurementInput::new(1800.0, -1.0));
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].field, Field::Ts);

        let notes = bounds.check(&MeasurementInput::new(f64::NAN, 0.9));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn grade_serializes_as_number_string() {
        let json = serde_json::to_string(&Grade::G54).unwrap();
        assert_eq!(json, "\"54\"");
    }
}
