//! Date formatting for report titles and file names

use crate::{Result, TamilTextError};
use chrono::{Datelike, NaiveDate};

/// Tamil month names
const TAMIL_MONTHS: [&str; 12] = [
    "ஜனவரி",
    "பிப்ரவரி",
    "மார்ச்",
    "ஏப்ரல்",
    "மே",
    "ஜூன்",
    "ஜூலை",
    "ஆகஸ்ட்",
    "செப்டம்பர்",
    "அக்டோபர்",
    "நவம்பர்",
    "டிசம்பர்",
];

/// Parse a `YYYY-MM-DD` date
///
/// A trailing time component (`2025-05-01T00:00:00Z`) is ignored.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| TamilTextError::InvalidDate(value.to_string()))
}

/// Format as day and month (e.g., "01-05")
pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%d-%m").to_string()
}

/// Format as a full date (e.g., "01-05-2025")
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Format an inclusive date range for a report title (e.g., "From 01-05 to 31-05")
pub fn format_date_range(from: NaiveDate, to: NaiveDate) -> String {
    format!("From {} to {}", format_day_month(from), format_day_month(to))
}

/// Parse two ISO dates and format them as a range
pub fn format_iso_range(from: &str, to: &str) -> Result<String> {
    Ok(format_date_range(parse_iso_date(from)?, parse_iso_date(to)?))
}

/// Compact date for file names (e.g., "01-05-2025")
pub fn file_date_stamp(date: NaiveDate) -> String {
    format_display_date(date)
}

/// Tamil month name for a 1-based month
pub fn tamil_month_name(month: u32) -> Option<&'static str> {
    TAMIL_MONTHS.get(month.checked_sub(1)? as usize).copied()
}

/// Month heading in Tamil with the year (e.g., "மே 2025")
pub fn format_tamil_month_year(date: NaiveDate) -> String {
    let month = tamil_month_name(date.month()).unwrap_or_default();
    format!("{month} {}", date.year())
}
