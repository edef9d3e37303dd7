use std::sync::Arc;

use cron_runner_core::Settings;
use cron_runner_exec::http::{HttpError, ReqwestHttpClient};
use cron_runner_exec::{PipelineClient, PollConfig, RetryConfig};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid BACKEND_URL: {0}")]
    BackendUrl(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] HttpError),
}

pub fn retry_config(settings: &Settings) -> RetryConfig {
    RetryConfig {
        max_retries: settings.max_retries,
        initial_backoff: settings.initial_backoff,
        max_backoff: settings.max_backoff,
        backoff_factor: settings.backoff_factor,
    }
}

pub fn poll_config(settings: &Settings) -> PollConfig {
    PollConfig {
        initial_interval: settings.poll_initial_interval,
        max_interval: settings.poll_max_interval,
        max_wait_time: settings.poll_max_wait_time,
    }
}

pub fn build_client(settings: &Settings) -> Result<PipelineClient, StartupError> {
    let base_url = url::Url::parse(&settings.backend_url)?;
    let http = ReqwestHttpClient::new()?;
    Ok(PipelineClient::new(
        Arc::new(http),
        base_url,
        SecretString::from(settings.api_token.expose_secret().to_owned()),
        retry_config(settings),
        poll_config(settings),
        settings.request_timeout,
    ))
}
