//! Shared field-parsing utilities for raw violation rows.
//!
//! Small, pure helpers used while turning raw column values into typed
//! record fields.

/// Splits a raw timestamp on its first space into date and time-of-day
/// components. A timestamp with no space yields an empty time component;
/// that is not an error.
#[must_use]
pub fn split_date_time(raw: &str) -> (String, String) {
    raw.split_once(' ').map_or_else(
        || (raw.to_string(), String::new()),
        |(date, time)| (date.to_string(), time.to_string()),
    )
}

/// Title-cases a street suffix so "ST" reads "St" and "AVE" reads "Ave",
/// keeping display and grouping consistent across source spellings.
#[must_use]
pub fn title_case_suffix(raw: &str) -> String {
    raw.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parses a coordinate column. Whitespace is trimmed; an empty or
/// unparseable value is `None`. Zero is a valid coordinate here and is
/// preserved, never treated as missing.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Typed, validated parse of a raw location string of the form
/// `"(latitude, longitude)"`. Returns `None` on any malformed input;
/// nothing is ever evaluated as code.
#[must_use]
pub fn parse_location(raw: &str) -> Option<(f64, f64)> {
    let inner = raw.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (lat, lng) = inner.split_once(',')?;
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lng.trim().parse::<f64>().ok()?;
    Some((latitude, longitude))
}
