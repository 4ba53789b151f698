//! Reporting utilities: evaluated results with advisory notes, and formatting.

use serde::Serialize;

use crate::domain::{Grade, InputBounds, MeasurementInput, PredictionResult, RangeNote};
use crate::error::AppError;
use crate::models::predict;

pub mod format;

pub use format::*;

/// A prediction together with the advisory range notes for its inputs.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub result: PredictionResult,
    pub notes: Vec<RangeNote>,
}

/// Evaluate one grade and collect range notes.
///
/// Out-of-range inputs are still evaluated; each note is logged at `warn` and
/// the result at `debug`.
pub fn evaluate(grade: Grade, input: &MeasurementInput, bounds: &InputBounds) -> Evaluation {
    let notes = bounds.check(input);
    for note in &notes {
        tracing::warn!(
            field = note.field.display_name(),
            value = note.value,
            min = note.min,
            max = note.max,
            "input outside suggested range"
        );
    }
    let result = predict(grade, input);
    tracing::debug!(%grade, density = input.density, ts = input.ts, value = result.value, "evaluated titre");
    Evaluation { result, notes }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    #[serde(flatten)]
    result: &'a PredictionResult,
    formatted: String,
    in_range: bool,
}

/// Serialize an evaluation for `titre predict --json`.
///
/// Non-finite values serialize as `null`.
pub fn to_json(evaluation: &Evaluation) -> Result<String, AppError> {
    let body = JsonResult {
        result: &evaluation.result,
        formatted: format_value(evaluation.result.value),
        in_range: evaluation.notes.is_empty(),
    };
    serde_json::to_string_pretty(&body)
        .map_err(|e| AppError::runtime(format!("Failed to serialize result: {e}")))
}
