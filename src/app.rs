//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves settings (`.env`, environment, flags)
//! - sets up logging
//! - dispatches to a form host (TUI, prompt, one-shot predict)

use std::io::{self, Write};

use clap::Parser;

use crate::cli::{Cli, Command, InputArgs, PredictArgs, PromptArgs};
use crate::config::Settings;
use crate::error::AppError;
use crate::report;

/// Entry point for the `titre` binary.
pub fn run() -> Result<(), AppError> {
    // `titre` and `titre -d 1300` behave like `titre form ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    let settings = Settings::from_env()?;
    crate::logging::init(cli.verbose, settings.log_filter.as_deref());
    tracing::debug!(?settings, "resolved settings");

    match cli.command {
        Command::Form(args) => handle_form(args, settings),
        Command::Predict(args) => handle_predict(args, settings),
        Command::Prompt(args) => handle_prompt(args, settings),
        Command::Equations => handle_equations(),
    }
}

fn apply_input_args(settings: Settings, args: &InputArgs) -> Settings {
    settings.with_overrides(args.density, args.ts, args.grade)
}

fn handle_form(args: InputArgs, settings: Settings) -> Result<(), AppError> {
    crate::tui::run(apply_input_args(settings, &args))
}

fn handle_predict(args: PredictArgs, settings: Settings) -> Result<(), AppError> {
    let settings = apply_input_args(settings, &args.input);
    let eval = report::evaluate(settings.grade, &settings.defaults, &settings.bounds);

    if args.json {
        println!("{}", report::to_json(&eval)?);
    } else {
        for note in &eval.notes {
            eprintln!("note: {note}");
        }
        println!("{}", report::format_result(&eval.result));
    }
    Ok(())
}

fn handle_prompt(args: PromptArgs, settings: Settings) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    let answers = crate::cli::prompt::prompt_for_inputs(&mut reader, &mut stdout, &settings, args.grade)?;
    let eval = report::evaluate(answers.grade, &answers.input, &settings.bounds);

    writeln!(stdout, "\n{}", report::format_card(&eval.result, &eval.notes))
        .map_err(|e| AppError::runtime(format!("Failed to write result: {e}")))?;
    Ok(())
}

fn handle_equations() -> Result<(), AppError> {
    print!("{}", report::format_equations());
    Ok(())
}

/// Rewrite argv so `titre` defaults to `titre form`.
///
/// Rules:
/// - `titre`                         -> `titre form`
/// - `titre -d 1300 ...`             -> `titre form -d 1300 ...`
/// - `titre --help/--version/-h/-V`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("form".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "form" | "predict" | "prompt" | "equations");
    if is_subcommand {
        return argv;
    }

    // A leading flag is treated as a form flag.
    if arg1.starts_with('-') {
        argv.insert(1, "form".to_string());
        return argv;
    }

    argv
}
