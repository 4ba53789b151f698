//! Command-line parsing for the titre predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the model code.

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::Grade;

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "titre", version, about = "P2O5 titre prediction from density and TS")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive terminal form.
    Form(InputArgs),
    /// Evaluate one grade and print the result.
    Predict(PredictArgs),
    /// Ask for density, TS and grade on stdin.
    Prompt(PromptArgs),
    /// Print the model equations.
    Equations,
}

/// Measured inputs and grade selection.
///
/// Unset values fall back to `TITRE_*` environment settings, then to the
/// built-in defaults (density 1290, TS 0.9, grade 29).
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// Measured density (kg/m³), suggested range 1220–1700.
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    pub density: Option<f64>,

    /// Measured TS (%), suggested range 0–100.
    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub ts: Option<f64>,

    /// Acid grade to display (29 or 54).
    #[arg(short = 'g', long, value_enum)]
    pub grade: Option<Grade>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PromptArgs {
    /// Grade to preselect (asked interactively when omitted).
    #[arg(short = 'g', long, value_enum)]
    pub grade: Option<Grade>,
}
