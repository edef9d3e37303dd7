mod common;

use std::time::Duration;

use common::{status, with_header, ScriptedHttp};
use cron_runner_exec::http::{HttpError, HttpRequestParts};
use cron_runner_exec::retry::{execute_with_retry, RequestError, RetryConfig};
use cron_runner_exec::CancellationToken;
use tokio::time::Instant;

fn cfg(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(30),
        backoff_factor: 2.0,
    }
}

fn req() -> HttpRequestParts {
    HttpRequestParts::post(url::Url::parse("http://backend.test/v1/internal/pipelines/all").unwrap())
        .header("Content-Type", "application/json")
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn succeeds_on_third_attempt_after_two_503s() {
    let http = ScriptedHttp::new()
        .on_post(status(503))
        .on_post(status(503))
        .on_post(status(200));
    let start = Instant::now();

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 3);
    assert_eq!(out.response.as_ref().map(|r| r.status), Some(200));
    assert!(out.final_error.is_none());
    assert_eq!(http.count("POST"), 3);

    let times = http.times("POST");
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_retry_budget() {
    let http = ScriptedHttp::new().on_post(status(503));

    let out = execute_with_retry(&http, &req(), &cfg(2), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 3);
    assert_eq!(http.count("POST"), 3);
    assert_eq!(out.response.as_ref().map(|r| r.status), Some(503));
    assert!(out.final_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn zero_retries_means_one_attempt() {
    let http = ScriptedHttp::new().on_post(status(502));

    let out = execute_with_retry(&http, &req(), &cfg(0), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 1);
    assert_eq!(http.count("POST"), 1);
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    let http = ScriptedHttp::new().on_post(status(404));

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 1);
    assert_eq!(out.response.as_ref().map(|r| r.status), Some(404));
    assert_eq!(http.count("POST"), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_errors_are_retried() {
    let http = ScriptedHttp::new()
        .on_post(Err(HttpError::Timeout))
        .on_post(Err(HttpError::Network("connection refused".into())))
        .on_post(status(201));

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 3);
    assert_eq!(out.response.as_ref().map(|r| r.status), Some(201));
    assert!(out.final_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn exhausted_transport_errors_surface_the_last_error() {
    let http = ScriptedHttp::new()
        .on_post(status(503))
        .on_post(Err(HttpError::Timeout));

    let out = execute_with_retry(&http, &req(), &cfg(2), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 3);
    assert!(out.response.is_none());
    assert!(matches!(
        out.final_error,
        Some(RequestError::Transport(HttpError::Timeout))
    ));
}

#[tokio::test(start_paused = true)]
async fn retry_after_overrides_backoff() {
    let http = ScriptedHttp::new()
        .on_post(with_header(429, "Retry-After", "7"))
        .on_post(status(200));

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &CancellationToken::new()).await;

    assert_eq!(out.attempts, 2);
    let times = http.times("POST");
    assert_eq!(times[1] - times[0], Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_backoff() {
    let http = ScriptedHttp::new().on_post(status(503));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });
    let start = Instant::now();

    let out = execute_with_retry(&http, &req(), &cfg(5), TIMEOUT, &cancel).await;

    assert!(out.is_cancelled());
    assert_eq!(out.attempts, 2);
    assert_eq!(http.count("POST"), 2);
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn first_attempt_fires_even_when_already_cancelled() {
    let http = ScriptedHttp::new().on_post(status(200));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &cancel).await;

    assert!(!out.is_cancelled());
    assert_eq!(out.attempts, 1);
    assert_eq!(out.response.as_ref().map(|r| r.status), Some(200));
    assert_eq!(http.count("POST"), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_stops_at_first_backoff() {
    let http = ScriptedHttp::new().on_post(status(503));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let out = execute_with_retry(&http, &req(), &cfg(3), TIMEOUT, &cancel).await;

    assert!(out.is_cancelled());
    assert_eq!(out.attempts, 1);
    assert_eq!(http.count("POST"), 1);
}
