use std::sync::Arc;
use std::time::Duration;

use cron_runner_core::{format_duration, JobCreatedResponse, JobState, JobStatus, JobStatusResponse};
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use crate::pipeline::config::PollConfig;
use crate::pipeline::result::{PollOutcome, StartOutcome, TriggerError, TriggerResult};
use crate::pipeline::state::{PollSchedule, TriggerState};
use crate::retry::{execute_with_retry, is_retryable_status, RequestError, RetryConfig};

pub const START_ALL_PATH: &str = "/v1/internal/pipelines/all";
pub const JOB_STATUS_PATH: &str = "/v1/internal/pipelines/jobs";

const BODY_SNIPPET_CHARS: usize = 512;

/// Starts backend pipeline jobs and tracks them to a terminal state.
pub struct PipelineClient {
    http: Arc<dyn HttpClient>,
    base_url: Url,
    token: SecretString,
    retry: RetryConfig,
    poll: PollConfig,
    request_timeout: Duration,
}

impl PipelineClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: Url,
        token: SecretString,
        retry: RetryConfig,
        poll: PollConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            token,
            retry,
            poll,
            request_timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn start_url(&self) -> Result<Url, TriggerError> {
        self.endpoint(START_ALL_PATH, None)
    }

    /// `{base}/v1/internal/pipelines/jobs/{job_id}`, with the id escaped as one path segment.
    pub fn job_status_url(&self, job_id: &str) -> Result<Url, TriggerError> {
        if job_id.is_empty() || job_id == "." || job_id == ".." {
            return Err(TriggerError::InvalidUrl(format!(
                "job id {job_id:?} is not a valid path segment"
            )));
        }
        self.endpoint(JOB_STATUS_PATH, Some(job_id))
    }

    fn endpoint(&self, path: &str, tail: Option<&str>) -> Result<Url, TriggerError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TriggerError::InvalidUrl(format!("{} cannot be a base url", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(path.trim_start_matches('/').split('/'));
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// Start a job through the retrying executor. Never polls.
    pub async fn start_job(&self, cancel: &CancellationToken) -> StartOutcome {
        transition(None, TriggerState::NotStarted, TriggerState::Starting);

        let outcome = match self.start_url() {
            Ok(url) => {
                info!(url = %url, "starting pipeline job");
                let req = HttpRequestParts::post(url)
                    .header("Authorization", self.bearer())
                    .header("Content-Type", "application/json");
                let outcome =
                    execute_with_retry(self.http.as_ref(), &req, &self.retry, self.request_timeout, cancel)
                        .await;
                interpret_start(outcome.response, outcome.attempts, outcome.final_error)
            }
            Err(err) => StartOutcome {
                state: TriggerState::StartFailed,
                job_id: None,
                attempts: 0,
                status_code: None,
                error: Some(err),
            },
        };

        transition(outcome.job_id.as_deref(), TriggerState::Starting, outcome.state);
        outcome
    }

    /// One non-retried status fetch.
    pub async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatus, TriggerError> {
        let url = self.job_status_url(job_id)?;
        self.fetch_status_at(job_id, url).await
    }

    async fn fetch_status_at(&self, job_id: &str, url: Url) -> Result<JobStatus, TriggerError> {
        let req = HttpRequestParts::get(url).header("Authorization", self.bearer());
        let resp = self
            .http
            .send(req, self.request_timeout)
            .await
            .map_err(TriggerError::Transport)?;

        if resp.status == 404 {
            return Err(TriggerError::JobNotFound(job_id.to_string()));
        }
        if !resp.is_success() {
            return Err(TriggerError::TerminalStatus {
                status: resp.status,
                body: body_snippet(&resp.body),
            });
        }

        let parsed: JobStatusResponse =
            serde_json::from_slice(&resp.body).map_err(|e| TriggerError::Parse(e.to_string()))?;
        Ok(parsed.data)
    }

    /// Poll until the job reports `completed` or `failed`, the wait ceiling passes, or `cancel` fires.
    ///
    /// Fetch failures of any kind are logged and retried on the next cycle.
    pub async fn poll_to_completion(&self, job_id: &str, cancel: &CancellationToken) -> PollOutcome {
        transition(Some(job_id), TriggerState::Started, TriggerState::Polling);

        let url = match self.job_status_url(job_id) {
            Ok(url) => url,
            Err(err) => return finish_poll(job_id, TriggerState::PollError, None, Some(err), 0),
        };

        let mut schedule = PollSchedule::start(&self.poll, Instant::now());
        let mut last: Option<JobStatus> = None;
        let mut polls = 0u32;

        loop {
            if cancel.is_cancelled() {
                return finish_poll(job_id, TriggerState::Cancelled, last, Some(TriggerError::Cancelled), polls);
            }
            if schedule.is_expired(Instant::now()) {
                let err = TriggerError::TimeoutExceeded(self.poll.max_wait_time);
                return finish_poll(job_id, TriggerState::TimedOut, last, Some(err), polls);
            }

            polls += 1;
            match self.fetch_status_at(job_id, url.clone()).await {
                Ok(status) => {
                    debug!(
                        job_id,
                        status = %status.status,
                        completed = status.pipelines_completed,
                        total = status.pipelines_total,
                        current = status.current_pipeline.as_deref().unwrap_or(""),
                        "job status update"
                    );
                    let job_state = status.status;
                    match job_state {
                        JobState::Completed => {
                            return finish_poll(job_id, TriggerState::Completed, Some(status), None, polls)
                        }
                        JobState::Failed => {
                            return finish_poll(job_id, TriggerState::Failed, Some(status), None, polls)
                        }
                        _ => last = Some(status),
                    }
                }
                Err(err) => {
                    warn!(job_id, error = %err, "failed to fetch job status, will retry");
                }
            }

            let wait = schedule.advance();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return finish_poll(job_id, TriggerState::Cancelled, last, Some(TriggerError::Cancelled), polls);
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Start a job and track it to a terminal state.
    pub async fn trigger_all(&self, cancel: &CancellationToken) -> TriggerResult {
        let start = Instant::now();
        let started = self.start_job(cancel).await;

        if started.state != TriggerState::Started {
            let result = start_result(started, start.elapsed());
            error!(
                attempts = result.attempts,
                status_code = result.status_code,
                error = %result.error_message().unwrap_or_default(),
                "failed to start pipeline job"
            );
            return result;
        }

        let job_id = started.job_id.unwrap_or_default();
        info!(
            job_id = %job_id,
            attempts = started.attempts,
            "pipeline job started, polling for completion"
        );

        let polled = self.poll_to_completion(&job_id, cancel).await;
        let duration = start.elapsed();

        let mut result = TriggerResult {
            success: false,
            job_id: Some(job_id.clone()),
            state: polled.state,
            attempts: started.attempts,
            duration,
            status_code: started.status_code,
            error: polled.error,
            job_details: None,
        };

        match (polled.state, polled.job) {
            (TriggerState::Completed | TriggerState::Failed, Some(job)) => {
                if job.is_success() {
                    result.success = true;
                    info!(
                        job_id = %job_id,
                        pipelines_completed = job.pipelines_completed,
                        job_duration_seconds = job.duration_seconds.unwrap_or_default(),
                        total_duration = %format_duration(duration),
                        "all pipelines completed successfully"
                    );
                } else {
                    error!(
                        job_id = %job_id,
                        job_status = %job.status,
                        pipelines_failed = job.pipelines_failed,
                        pipelines_completed = job.pipelines_completed,
                        failed = ?job.failed_pipelines(),
                        error = job.error.as_deref().unwrap_or(""),
                        "pipeline job failed"
                    );
                    result.error = Some(TriggerError::JobUnsuccessful {
                        status: job.status,
                        pipelines_failed: job.pipelines_failed,
                        message: job.error.clone(),
                    });
                }
                result.job_details = Some(job);
            }
            (state, job) => {
                result.job_details = job;
                error!(
                    job_id = %job_id,
                    state = %state,
                    error = %result.error_message().unwrap_or_default(),
                    duration = %format_duration(duration),
                    "pipeline job polling failed"
                );
            }
        }

        result
    }

    /// Fire-and-forget: start a job and report on the start alone.
    pub async fn start_only(&self, cancel: &CancellationToken) -> TriggerResult {
        let start = Instant::now();
        let started = self.start_job(cancel).await;
        let result = start_result(started, start.elapsed());

        if result.success {
            info!(
                job_id = result.job_id.as_deref().unwrap_or(""),
                attempts = result.attempts,
                "pipeline job started (fire-and-forget)"
            );
        } else {
            error!(
                attempts = result.attempts,
                status_code = result.status_code,
                error = %result.error_message().unwrap_or_default(),
                "failed to start pipeline job"
            );
        }
        result
    }
}

fn interpret_start(
    response: Option<HttpResponseParts>,
    attempts: u32,
    final_error: Option<RequestError>,
) -> StartOutcome {
    let failed = |status_code: Option<u16>, err: TriggerError| StartOutcome {
        state: TriggerState::StartFailed,
        job_id: None,
        attempts,
        status_code,
        error: Some(err),
    };

    if let Some(RequestError::Cancelled) = final_error {
        return failed(None, TriggerError::Cancelled);
    }

    let resp = match (response, final_error) {
        (Some(resp), _) => resp,
        (None, Some(RequestError::Transport(err))) => return failed(None, TriggerError::Transport(err)),
        (None, _) => {
            return failed(
                None,
                TriggerError::Transport(HttpError::Other("no response received".to_string())),
            )
        }
    };

    let status = Some(resp.status);
    if !resp.is_success() {
        let body = body_snippet(&resp.body);
        let err = if is_retryable_status(resp.status) {
            TriggerError::TransientStatus {
                status: resp.status,
                body,
            }
        } else {
            TriggerError::TerminalStatus {
                status: resp.status,
                body,
            }
        };
        return failed(status, err);
    }

    let created: JobCreatedResponse = match serde_json::from_slice(&resp.body) {
        Ok(created) => created,
        Err(e) => return failed(status, TriggerError::Parse(e.to_string())),
    };
    if created.data.job_id.is_empty() {
        return failed(status, TriggerError::MissingJobId);
    }

    StartOutcome {
        state: TriggerState::Started,
        job_id: Some(created.data.job_id),
        attempts,
        status_code: status,
        error: None,
    }
}

fn start_result(started: StartOutcome, duration: Duration) -> TriggerResult {
    TriggerResult {
        success: started.state == TriggerState::Started,
        job_id: started.job_id,
        state: started.state,
        attempts: started.attempts,
        duration,
        status_code: started.status_code,
        error: started.error,
        job_details: None,
    }
}

fn finish_poll(
    job_id: &str,
    state: TriggerState,
    job: Option<JobStatus>,
    error: Option<TriggerError>,
    polls: u32,
) -> PollOutcome {
    transition(Some(job_id), TriggerState::Polling, state);
    PollOutcome {
        state,
        job,
        error,
        polls,
    }
}

fn transition(job_id: Option<&str>, from: TriggerState, to: TriggerState) {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    debug!(job_id = job_id.unwrap_or(""), from = %from, to = %to, "trigger state transition");
}

fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut out: String = text.chars().take(BODY_SNIPPET_CHARS).collect();
    if text.chars().count() > BODY_SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}
