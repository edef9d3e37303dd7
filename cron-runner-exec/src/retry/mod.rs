mod backoff;
mod config;
mod executor;
mod headers;

pub use backoff::{compute_backoff, is_retryable, is_retryable_status};
pub use config::RetryConfig;
pub use executor::{execute_with_retry, RequestError, RequestOutcome};
pub use headers::parse_retry_after;
