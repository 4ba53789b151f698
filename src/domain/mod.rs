//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the acid grade selector (`Grade`)
//! - measured inputs and derived results (`MeasurementInput`, `PredictionResult`)
//! - host-side input policy (`InputBounds`, `RangeNote`)

pub mod types;

pub use types::*;
