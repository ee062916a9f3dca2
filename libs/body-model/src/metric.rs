//! Tracked measurements

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A measurement kind that can be turned into a `Series`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Body weight, one reading per day
    Weight,
    /// Distance of the day's run
    RunDistance,
    /// Duration of the day's run in minutes
    RunDuration,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Weight, Metric::RunDistance, Metric::RunDuration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::RunDistance => "distance",
            Self::RunDuration => "duration",
        }
    }

    /// Human-readable label used in reports and chart titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weight => "Weight",
            Self::RunDistance => "Run Distance",
            Self::RunDuration => "Run Duration",
        }
    }

    /// Unit suffix for printed values
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Weight => "lbs",
            Self::RunDistance => "mi",
            Self::RunDuration => "min",
        }
    }

    /// Whether a falling value is good news for this metric
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::Weight)
    }

    /// Whether the metric lives in the run table
    pub fn is_run(&self) -> bool {
        matches!(self, Self::RunDistance | Self::RunDuration)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weight" | "w" => Ok(Self::Weight),
            "distance" | "run-distance" | "run_distance" => Ok(Self::RunDistance),
            "duration" | "run-duration" | "run_duration" => Ok(Self::RunDuration),
            other => Err(format!(
                "unknown metric '{}': expected weight, distance or duration",
                other
            )),
        }
    }
}

/// A logged run: two measurements sharing one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub date: NaiveDate,
    pub distance: f64,
    pub duration: f64,
}

impl RunRecord {
    pub fn new(date: NaiveDate, distance: f64, duration: f64) -> Self {
        Self {
            date,
            distance,
            duration,
        }
    }

    /// Value of the given run metric, `None` for non-run metrics
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::RunDistance => Some(self.distance),
            Metric::RunDuration => Some(self.duration),
            Metric::Weight => None,
        }
    }

    /// Minutes per distance unit, when distance is positive
    pub fn pace(&self) -> Option<f64> {
        (self.distance > 0.0).then(|| self.duration / self.distance)
    }
}
