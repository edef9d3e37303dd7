use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use crate::retry::backoff::{compute_backoff, is_retryable};
use crate::retry::config::RetryConfig;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("request cancelled")]
    Cancelled,
}

/// What one logical request produced after all of its attempts.
#[derive(Debug)]
pub struct RequestOutcome {
    /// The terminal response, or the last retryable one when the budget ran out.
    pub response: Option<HttpResponseParts>,
    pub attempts: u32,
    pub elapsed: Duration,
    pub final_error: Option<RequestError>,
}

impl RequestOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.final_error, Some(RequestError::Cancelled))
    }
}

/// Send `req`, retrying transport failures, 429 and 5xx responses up to `cfg.max_retries` times.
///
/// The first attempt always fires. The backoff wait between attempts races `cancel`; an
/// in-flight request is never aborted, cancellation is observed at the next wait.
pub async fn execute_with_retry(
    http: &dyn HttpClient,
    req: &HttpRequestParts,
    cfg: &RetryConfig,
    timeout: Duration,
    cancel: &CancellationToken,
) -> RequestOutcome {
    let start = Instant::now();
    let mut last_response: Option<HttpResponseParts> = None;
    let mut last_error: Option<HttpError> = None;

    for attempt in 0..=cfg.max_retries {
        if attempt > 0 {
            let backoff =
                compute_backoff(cfg, attempt - 1, last_response.as_ref(), SystemTime::now());
            info!(
                attempt = attempt + 1,
                backoff_ms = backoff.as_millis() as u64,
                "retrying after backoff"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return RequestOutcome {
                        response: None,
                        attempts: attempt,
                        elapsed: start.elapsed(),
                        final_error: Some(RequestError::Cancelled),
                    };
                }
                _ = tokio::time::sleep(backoff) => {}
            }
        }

        debug!(
            attempt = attempt + 1,
            method = %req.method,
            url = %req.url,
            "sending request"
        );

        match http.send(req.clone(), timeout).await {
            Ok(resp) => {
                debug!(status = resp.status, attempt = attempt + 1, "received response");

                if !is_retryable(Some(&resp), None) {
                    return RequestOutcome {
                        response: Some(resp),
                        attempts: attempt + 1,
                        elapsed: start.elapsed(),
                        final_error: None,
                    };
                }

                if attempt < cfg.max_retries {
                    warn!(
                        status = resp.status,
                        attempt = attempt + 1,
                        "retryable error received"
                    );
                }
                last_response = Some(resp);
                last_error = None;
            }
            Err(err) => {
                warn!(error = %err, attempt = attempt + 1, "request failed with error");
                last_response = None;
                last_error = Some(err);
            }
        }
    }

    RequestOutcome {
        response: last_response,
        attempts: cfg.max_attempts(),
        elapsed: start.elapsed(),
        final_error: last_error.map(RequestError::Transport),
    }
}
