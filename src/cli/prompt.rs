//! Line-oriented input form.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the prompt provides the "run `titre prompt` and type the values" UX
//!
//! Each question shows its default in brackets; an empty answer keeps it and
//! `q` cancels.

use std::io::{BufRead, Write};

use crate::config::{Settings, parse_decimal};
use crate::domain::{Grade, MeasurementInput};
use crate::error::AppError;

/// Values collected by the prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptAnswers {
    pub input: MeasurementInput,
    pub grade: Grade,
}

/// Ask for density, TS and (unless preselected) the grade.
pub fn prompt_for_inputs<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    settings: &Settings,
    grade: Option<Grade>,
) -> Result<PromptAnswers, AppError> {
    let bounds = &settings.bounds;
    let density = ask(
        reader,
        writer,
        &format!(
            "Density (kg/m³, {}–{}) [{}]: ",
            bounds.density_min, bounds.density_max, settings.defaults.density
        ),
        settings.defaults.density,
        parse_decimal,
    )?;
    let ts = ask(
        reader,
        writer,
        &format!(
            "TS (%, {}–{}) [{}]: ",
            bounds.ts_min, bounds.ts_max, settings.defaults.ts
        ),
        settings.defaults.ts,
        parse_decimal,
    )?;
    let grade = match grade {
        Some(grade) => grade,
        None => ask(
            reader,
            writer,
            &format!("Grade to display (29 or 54) [{}]: ", settings.grade),
            settings.grade,
            Grade::parse,
        )?,
    };

    Ok(PromptAnswers {
        input: MeasurementInput::new(density, ts),
        grade,
    })
}

fn ask<R, W, T, F>(reader: &mut R, writer: &mut W, question: &str, default: T, parse: F) -> Result<T, AppError>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Option<T>,
{
    loop {
        write!(writer, "{question}")
            .and_then(|_| writer.flush())
            .map_err(|e| AppError::runtime(format!("Failed to write prompt: {e}")))?;

        let mut line = String::new();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Pass values with `titre predict -d <density> -t <ts>`.",
            ));
        }

        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        match parse(answer) {
            Some(value) => return Ok(value),
            None => {
                writeln!(writer, "Invalid value: '{answer}'.")
                    .map_err(|e| AppError::runtime(format!("Failed to write prompt: {e}")))?;
            }
        }
    }
}
