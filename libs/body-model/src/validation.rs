//! Validation Utilities
//!
//! Parsing of command-line dates and user names.
//! No database or IO dependencies.

use chrono::NaiveDate;
use errors::{BodyLoggerError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Storage and display format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::disallowed_methods)] // pattern is a compile-time constant
        Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap()
    })
}

/// Parse a date given on the command line
///
/// Accepts `YYYY-MM-DD` with or without zero padding on month and day.
/// US-style dates and out-of-range components are rejected.
///
/// # Examples
/// ```
/// use body_model::parse_date;
///
/// assert!(parse_date("2017-1-1").is_ok());
/// assert!(parse_date("2017-01-01").is_ok());
/// assert!(parse_date("11/11/2017").is_err());
/// assert!(parse_date("2017-15-1").is_err());
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let caps = date_pattern()
        .captures(trimmed)
        .ok_or_else(|| BodyLoggerError::invalid_date(input))?;

    let year: i32 = caps[1]
        .parse()
        .map_err(|_| BodyLoggerError::invalid_date(input))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| BodyLoggerError::invalid_date(input))?;
    let day: u32 = caps[3]
        .parse()
        .map_err(|_| BodyLoggerError::invalid_date(input))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| BodyLoggerError::invalid_date(input))
}

/// Render a date in storage format (`YYYY-MM-DD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validate a user name before it becomes part of a file path
///
/// Rules:
/// - Length: 1-64 characters
/// - Characters: alphanumeric, underscore (_), hyphen (-), dot (.)
/// - Cannot start with a dot
pub fn validate_user_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(BodyLoggerError::InvalidUser(name.to_string()));
    }

    if name.starts_with('.') {
        return Err(BodyLoggerError::InvalidUser(name.to_string()));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(BodyLoggerError::InvalidUser(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_rejects_other_shapes() {
        assert!(parse_date("11/11/2017").is_err());
        assert!(parse_date("11/11/17").is_err());
        assert!(parse_date("1/15/2017").is_err());
        assert!(parse_date("1/1/2017").is_err());
        assert!(parse_date("2017-15-1").is_err());
        assert!(parse_date("2017-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_normalizes_padding() {
        let expected = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        assert_eq!(parse_date("2017-1-1").unwrap(), expected);
        assert_eq!(parse_date("2017-01-01").unwrap(), expected);
        assert_eq!(parse_date("2017-1-01").unwrap(), expected);
        assert_eq!(
            parse_date("2017-11-12").unwrap(),
            NaiveDate::from_ymd_opt(2017, 11, 12).unwrap()
        );
    }

    #[test]
    fn test_format_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        assert_eq!(format_date(date), "2017-01-01");
    }

    #[test]
    fn test_validate_user_name() {
        assert!(validate_user_name("ryder").is_ok());
        assert!(validate_user_name("jane.doe_2").is_ok());
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name("../etc").is_err());
        assert!(validate_user_name("a/b").is_err());
        assert!(validate_user_name(".hidden").is_err());
        assert!(validate_user_name("bad name").is_err());
    }
}
