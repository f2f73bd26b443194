use chrono::{Local, TimeZone};
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn get_current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Renders a millisecond Unix timestamp in local time. Out-of-range values
/// and unusable format strings fall back to the raw number.
pub fn format_timestamp(timestamp_ms: u64, format: &str) -> String {
    match i64::try_from(timestamp_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
    {
        Some(time) => {
            let mut out = String::new();
            match write!(out, "{}", time.format(format)) {
                Ok(()) => out,
                Err(_) => timestamp_ms.to_string(),
            }
        }
        None => timestamp_ms.to_string(),
    }
}
