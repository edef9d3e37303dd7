use std::time::{Duration, SystemTime};

use httpdate::parse_http_date;

/// Parse a `Retry-After` value: either delta seconds or an HTTP-date.
///
/// A date in the past (or a negative delta) yields `Duration::ZERO`; values that are
/// neither form yield `None`.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let v = value.trim();
    if let Ok(secs) = v.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    if let Ok(secs) = v.parse::<i64>() {
        if secs < 0 {
            return Some(Duration::ZERO);
        }
    }
    let at = parse_http_date(v).ok()?;
    Some(at.duration_since(now).unwrap_or(Duration::ZERO))
}
