#![forbid(unsafe_code)]

//! Trigger-and-track engine for the cron runner.
//!
//! `retry` owns the backoff policy and the retrying request executor, `pipeline` drives a
//! backend job from start to a terminal state, and `health` holds the state the HTTP frontend
//! reports.

pub mod health;
pub mod http;
pub mod pipeline;
pub mod retry;

pub use crate::health::{
    HealthReport, HealthSnapshot, HealthState, PipelineRunStatus, ReadinessReport, SERVICE_NAME,
};
pub use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use crate::pipeline::{
    PipelineClient, PollConfig, PollOutcome, StartOutcome, TriggerError, TriggerResult,
    TriggerState,
};
pub use crate::retry::{RequestError, RequestOutcome, RetryConfig};

pub use tokio_util::sync::CancellationToken;
