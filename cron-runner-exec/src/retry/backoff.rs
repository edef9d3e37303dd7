use std::time::{Duration, SystemTime};

use crate::http::{HttpError, HttpResponseParts};
use crate::retry::config::RetryConfig;
use crate::retry::headers::parse_retry_after;

const TOO_MANY_REQUESTS: u16 = 429;

/// Wait before the retry that follows attempt `attempt_index` (zero-based: index 0 is the wait
/// before the second attempt).
///
/// A 429 carrying a usable `Retry-After` wins outright. Otherwise the wait is
/// `initial_backoff * backoff_factor^attempt_index`, capped at `max_backoff`.
pub fn compute_backoff(
    cfg: &RetryConfig,
    attempt_index: u32,
    prior_response: Option<&HttpResponseParts>,
    now: SystemTime,
) -> Duration {
    if let Some(resp) = prior_response {
        if resp.status == TOO_MANY_REQUESTS {
            if let Some(delay) = resp
                .header("retry-after")
                .and_then(|v| parse_retry_after(v, now))
            {
                return delay;
            }
        }
    }

    let exp = i32::try_from(attempt_index).unwrap_or(i32::MAX);
    let raw = cfg.initial_backoff.as_secs_f64() * cfg.backoff_factor.powi(exp);
    let capped = raw.min(cfg.max_backoff.as_secs_f64());
    Duration::try_from_secs_f64(capped).unwrap_or(cfg.max_backoff)
}

pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504) || status >= 500
}

/// Transport errors and missing responses are retryable; so are 429 and every 5xx.
/// Everything else ends the retry loop, including 4xx application errors.
pub fn is_retryable(response: Option<&HttpResponseParts>, error: Option<&HttpError>) -> bool {
    if error.is_some() {
        return true;
    }
    match response {
        None => true,
        Some(resp) => is_retryable_status(resp.status),
    }
}
