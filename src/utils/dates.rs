// src/utils/dates.rs

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use regex::Regex;

use crate::error::AppError;

/// Display format for completion times: `DD.MM.YYYY HH:MM:SS`.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Timestamp part of exported file names.
pub const FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

static DISPLAY_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2}$").expect("static regex is valid")
});

pub fn format_display(at: &DateTime<Utc>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// Parses a `DD.MM.YYYY HH:MM:SS` string as UTC.
///
/// The shape must match exactly; chrono alone would also accept
/// unpadded fields.
pub fn parse_display(input: &str) -> Result<DateTime<Utc>, AppError> {
    if !DISPLAY_SHAPE.is_match(input) {
        return Err(AppError::BadRequest(format!(
            "Completion time '{}' must look like DD.MM.YYYY HH:MM:SS",
            input
        )));
    }
    NaiveDateTime::parse_from_str(input, DISPLAY_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| AppError::BadRequest(format!("Invalid completion time '{}': {}", input, e)))
}

/// How long a scoring confirmation may be recorded after it was issued.
pub const CONFIRMATION_WINDOW_MINUTES: i64 = 30;

/// Accepts a confirmation time no later than `now` and no older than
/// [`CONFIRMATION_WINDOW_MINUTES`].
pub fn ensure_recent(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if at > now {
        return Err(AppError::BadRequest(format!(
            "Completion time {} is in the future",
            format_display(&at)
        )));
    }
    if now - at > Duration::minutes(CONFIRMATION_WINDOW_MINUTES) {
        return Err(AppError::BadRequest(format!(
            "Completion time {} is older than {} minutes",
            format_display(&at),
            CONFIRMATION_WINDOW_MINUTES
        )));
    }
    Ok(())
}

/// Current time truncated to whole seconds.
pub fn now_seconds() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
