use std::time::Duration;

use cron_runner_core::{format_duration, JobState, JobStatus};

use crate::http::HttpError;
use crate::pipeline::state::TriggerState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TriggerError {
    #[error("request failed: {0}")]
    Transport(#[source] HttpError),

    #[error("retries exhausted, last status {status}: {body}")]
    TransientStatus { status: u16, body: String },

    #[error("unexpected status {status}: {body}")]
    TerminalStatus { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("no job ID in response")]
    MissingJobId,

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("polling timeout after {}", format_duration(*.0))]
    TimeoutExceeded(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("job finished with status {status} ({pipelines_failed} pipelines failed)")]
    JobUnsuccessful {
        status: JobState,
        pipelines_failed: u32,
        message: Option<String>,
    },
}

/// Outcome of a single trigger, handed back to whichever frontend asked for it.
#[derive(Debug, Clone)]
pub struct TriggerResult {
    pub success: bool,
    pub job_id: Option<String>,
    pub state: TriggerState,
    /// Attempts spent on the start request.
    pub attempts: u32,
    pub duration: Duration,
    /// HTTP status of the start response, when one was received.
    pub status_code: Option<u16>,
    pub error: Option<TriggerError>,
    pub job_details: Option<JobStatus>,
}

impl TriggerResult {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| match e {
            TriggerError::JobUnsuccessful {
                message: Some(m), ..
            } if !m.is_empty() => format!("{e}: {m}"),
            _ => e.to_string(),
        })
    }
}

#[derive(Debug)]
pub struct StartOutcome {
    pub state: TriggerState,
    pub job_id: Option<String>,
    pub attempts: u32,
    pub status_code: Option<u16>,
    pub error: Option<TriggerError>,
}

#[derive(Debug)]
pub struct PollOutcome {
    pub state: TriggerState,
    /// Last snapshot fetched, terminal or not.
    pub job: Option<JobStatus>,
    pub error: Option<TriggerError>,
    pub polls: u32,
}
