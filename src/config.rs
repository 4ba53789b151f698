//! Host configuration from `.env` and the process environment.
//!
//! Precedence: CLI flags > environment (including `.env`) > built-in defaults.

use crate::domain::{Grade, InputBounds, MeasurementInput};
use crate::error::AppError;

pub const ENV_DENSITY: &str = "TITRE_DENSITY";
pub const ENV_TS: &str = "TITRE_TS";
pub const ENV_GRADE: &str = "TITRE_GRADE";
pub const ENV_LOG: &str = "TITRE_LOG";

/// Resolved host settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Initial measured values shown by the form hosts.
    pub defaults: MeasurementInput,
    /// Initially selected grade.
    pub grade: Grade,
    pub bounds: InputBounds,
    /// Log filter directive from `TITRE_LOG`, if set.
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults: InputBounds::STANDARD.defaults(),
            grade: Grade::G29,
            bounds: InputBounds::STANDARD,
            log_filter: None,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Settings::default();

        if let Some(raw) = non_empty(lookup(ENV_DENSITY)) {
            settings.defaults.density = parse_f64(ENV_DENSITY, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_TS)) {
            settings.defaults.ts = parse_f64(ENV_TS, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_GRADE)) {
            settings.grade = Grade::parse(&raw).ok_or_else(|| {
                AppError::usage(format!("Invalid {ENV_GRADE}='{raw}' (expected 29 or 54)."))
            })?;
        }
        settings.log_filter = non_empty(lookup(ENV_LOG));

        Ok(settings)
    }

    /// Apply per-invocation overrides.
    pub fn with_overrides(mut self, density: Option<f64>, ts: Option<f64>, grade: Option<Grade>) -> Self {
        if let Some(density) = density {
            self.defaults.density = density;
        }
        if let Some(ts) = ts {
            self.defaults.ts = ts;
        }
        if let Some(grade) = grade {
            self.grade = grade;
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a float written with either `.` or `,` as decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

fn parse_f64(key: &str, raw: &str) -> Result<f64, AppError> {
    parse_decimal(raw)
        .ok_or_else(|| AppError::usage(format!("Invalid {key}='{raw}' (expected a number).")))
}
