//! Timestamps written into the customize file

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Format of `date_added` / `date_updated` values
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the "Last Generated" footer line
pub const GENERATED_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// The single "now" shared by every timestamp of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTimestamp {
    /// Local wall-clock time for entity stamps
    pub stamp: String,
    /// Human-readable date for the footer banner
    pub generated: String,
}

impl RunTimestamp {
    /// Capture the current local time
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    /// Build timestamps for a fixed instant
    pub fn at<Tz>(instant: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            stamp: instant.format(STAMP_FORMAT).to_string(),
            generated: instant.format(GENERATED_FORMAT).to_string(),
        }
    }
}
