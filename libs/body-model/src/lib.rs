//! Body Model Library
//!
//! Core data types shared by the record store, the trend analyzer and the CLI.
//! Pure logic only, no database or IO dependencies.
//!
//! # Modules
//!
//! - `series`: `Sample` and the date-ordered `Series`
//! - `metric`: tracked measurements (weight, run distance, run duration)
//! - `validation`: date and user-name parsing for command-line input
//!
//! # Example
//!
//! ```
//! use body_model::{parse_date, Sample, Series};
//!
//! let series = Series::from_samples(vec![
//!     Sample::new(parse_date("2024-01-08").unwrap(), 195.0),
//!     Sample::new(parse_date("2024-1-1").unwrap(), 200.0),
//! ]);
//! assert_eq!(series.len(), 2);
//! assert_eq!(series.first().unwrap().value, 200.0);
//! ```

pub mod metric;
pub mod series;
pub mod validation;

// Re-exports for convenience
pub use metric::{Metric, RunRecord};
pub use series::{Sample, Series};
pub use validation::{format_date, parse_date, validate_user_name, DATE_FORMAT};
