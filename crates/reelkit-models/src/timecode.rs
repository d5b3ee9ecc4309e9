//! Timecode parsing and formatting.
//!
//! Payloads and analysis output carry timestamps as `"HH:MM:SS"`,
//! `"MM:SS"`, or bare seconds, with optional fractional seconds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimecodeError {
    #[error("invalid timecode: {0}")]
    Invalid(String),
}

/// Parse a timecode string to total seconds.
pub fn parse_timecode(ts: &str) -> Result<f64, TimecodeError> {
    let invalid = || TimecodeError::Invalid(ts.to_string());
    let parts: Vec<&str> = ts.split(':').collect();

    let parsed: Result<Vec<f64>, _> = parts.iter().map(|p| p.trim().parse::<f64>()).collect();
    let parsed = parsed.map_err(|_| invalid())?;

    if parsed.iter().any(|v| *v < 0.0) {
        return Err(invalid());
    }

    match parsed.as_slice() {
        [seconds] => Ok(*seconds),
        [minutes, seconds] => Ok(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Ok(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => Err(invalid()),
    }
}

/// Format seconds as `"HH:MM:SS"` (whole seconds, rounded down).
pub fn format_timecode(total_secs: f64) -> String {
    let total = total_secs.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// A half-open window within a media source, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeWindow {
    /// Build a window from two timecode strings, requiring start < end.
    pub fn from_timecodes(start: &str, end: &str) -> Result<Self, TimecodeError> {
        let start_secs = parse_timecode(start)?;
        let end_secs = parse_timecode(end)?;
        if start_secs >= end_secs {
            return Err(TimecodeError::Invalid(format!(
                "window start {start} is not before end {end}"
            )));
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}
