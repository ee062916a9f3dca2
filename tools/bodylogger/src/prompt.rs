//! Interactive input for values left off the command line

use anyhow::{anyhow, Context as _, Result};
use body_model::parse_date;
use chrono::NaiveDate;
use colored::*;
use errors::BodyLoggerError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Parse a measurement that must be a positive, finite number
pub fn parse_measurement(field: &str, input: &str) -> errors::Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| BodyLoggerError::invalid_value(field, format!("'{}' is not a number", input.trim())))?;
    validate_measurement(field, value)
}

/// Reject zero, negative and non-finite measurements
pub fn validate_measurement(field: &str, value: f64) -> errors::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BodyLoggerError::invalid_value(
            field,
            format!("expected a positive number, got {}", value),
        ));
    }
    Ok(value)
}

/// `clap` value parser for dates
pub fn date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

/// Ask until `parse` accepts the answer
///
/// Ctrl+C or Ctrl+D abort the command.
pub fn prompt_with<T>(message: &str, parse: impl Fn(&str) -> errors::Result<T>) -> Result<T> {
    let mut rl = DefaultEditor::new().context("Failed to initialize readline")?;

    loop {
        match rl.readline(&format!("{}: ", message)) {
            Ok(line) => match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => eprintln!("{} {}", "Error:".red(), e),
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Err(anyhow!("input cancelled"));
            },
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }
}

/// Use `given` or ask for a measurement
pub fn measurement_or_prompt(given: Option<f64>, field: &str, message: &str) -> Result<f64> {
    match given {
        Some(value) => Ok(validate_measurement(field, value)?),
        None => prompt_with(message, |input| parse_measurement(field, input)),
    }
}

/// Use `given` or ask for a date
pub fn date_or_prompt(given: Option<NaiveDate>, message: &str) -> Result<NaiveDate> {
    match given {
        Some(date) => Ok(date),
        None => prompt_with(message, parse_date),
    }
}
