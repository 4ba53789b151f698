//! Formatted terminal output: result cards and the equations view.
//!
//! We keep formatting code in one place so:
//! - the predictor stays free of presentation concerns
//! - the CLI, the prompt and the TUI print identical text

use crate::domain::{Grade, MeasurementInput, PredictionResult, RangeNote};
use crate::models::{TERM_LABELS, model_for};

/// Disclaimer shown under every result.
pub const FOOTER: &str =
    "Internal decision aid based on polynomial models. Always confirm with lab analysis when the value is critical.";

/// Quoted precision of the fitted models.
pub const QUOTED_PRECISION: &str = "94.4%";

/// A titre value the way the form displays it: two decimals and a `%` suffix.
pub fn format_value(value: f64) -> String {
    format!("{value:.2} %")
}

/// One-line result: `Titre 29%: 25.80 %`.
pub fn format_result(result: &PredictionResult) -> String {
    format!("{}: {}", result.label, format_value(result.value))
}

/// Multi-line result card used by `titre predict` and `titre prompt`.
pub fn format_card(result: &PredictionResult, notes: &[RangeNote]) -> String {
    let mut out = String::new();

    out.push_str("=== titre - P2O5 titre prediction ===\n");
    out.push_str(&format!(
        "Inputs: density={} kg/m³ | TS={} %\n",
        result.density, result.ts
    ));
    out.push_str(&format!("{}\n", format_result(result)));
    for note in notes {
        out.push_str(&format!("note: {note}\n"));
    }
    out.push('\n');
    out.push_str(FOOTER);
    out.push('\n');

    out
}

/// Render the model for `grade` as a readable equation.
///
/// Example: `Titre 54% = 88.015120 - 0.102618·density + ...`
pub fn format_equation(grade: Grade) -> String {
    let coefficients = model_for(grade).coefficients();
    let mut out = format!("{} = {:.6}", grade.label(), coefficients[0]);
    for (c, label) in coefficients.iter().zip(TERM_LABELS.iter()).skip(1) {
        let sign = if c.is_sign_negative() { '-' } else { '+' };
        out.push_str(&format!(" {sign} {:.6}·{label}", c.abs()));
    }
    out
}

/// Both equations plus the input ranges they were fitted on.
pub fn format_equations() -> String {
    let mut out = String::new();
    out.push_str("Models (density in kg/m³, TS in %):\n");
    for grade in Grade::ALL {
        out.push_str(&format!("  {}\n", format_equation(grade)));
    }
    out.push_str(&format!(
        "Quoted precision: {QUOTED_PRECISION}. Suggested inputs: density 1220–1700, TS 0–100.\n"
    ));
    out
}

/// Compact input summary for status lines.
pub fn format_inputs(input: &MeasurementInput) -> String {
    format!("density={:.1} | TS={:.2}", input.density, input.ts)
}
