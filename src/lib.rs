//! `titre` library crate.
//!
//! The binary (`titre`) is a thin wrapper around this library so that:
//!
//! - the predictor is testable without spawning processes
//! - the models can be reused by other front-ends

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod tui;

pub use domain::{Grade, MeasurementInput, PredictionResult};
pub use models::{predict, predict_titre_29, predict_titre_54};
