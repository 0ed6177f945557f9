use chrono::{DateTime, Utc};

/// Human-readable age of `then` relative to `now`, e.g. `5 minutes ago`.
///
/// Timestamps in the future (clock skew between machines) read as `just now`.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 10 {
        return "just now".to_string();
    }

    let (value, unit) = match secs {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// First `len` characters of an object id.
pub fn short_id(object: &str, len: usize) -> &str {
    match object.char_indices().nth(len) {
        Some((idx, _)) => &object[..idx],
        None => object,
    }
}
