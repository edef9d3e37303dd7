use std::net::SocketAddr;

use cron_runner_core::{format_duration, Settings};
use cron_runner_exec::{CancellationToken, PipelineClient, TriggerResult};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::args::Mode;
use crate::exit_codes;
use crate::server::{self, AppState};
use crate::shutdown;

pub async fn run(mode: Mode, settings: &Settings, client: PipelineClient) -> i32 {
    match mode {
        Mode::Server => run_server(settings, client).await,
        Mode::Once => run_once(&client).await,
        Mode::FireAndForget => run_fire_and_forget(&client).await,
    }
}

/// Cancel `token` when the process is asked to stop.
fn cancel_on_signal(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        shutdown::wait_for_signal().await;
        info!("received shutdown signal, cancelling trigger");
        token.cancel();
    });
}

pub async fn run_once(client: &PipelineClient) -> i32 {
    info!("running in CLI mode (single execution)");
    let cancel = CancellationToken::new();
    cancel_on_signal(&cancel);

    let result = client.trigger_all(&cancel).await;
    report(&result, "pipeline completed successfully", "pipeline trigger failed")
}

pub async fn run_fire_and_forget(client: &PipelineClient) -> i32 {
    info!("running in fire-and-forget mode");
    let cancel = CancellationToken::new();
    cancel_on_signal(&cancel);

    let result = client.start_only(&cancel).await;
    report(&result, "pipeline job started", "pipeline job could not be started")
}

fn report(result: &TriggerResult, ok: &str, failed: &str) -> i32 {
    let job_id = result.job_id.as_deref().unwrap_or("");
    let duration = format_duration(result.duration);
    if result.success {
        info!(job_id, attempts = result.attempts, duration = %duration, "{ok}");
        return exit_codes::SUCCESS;
    }

    let error = result.error_message().unwrap_or_default();
    match &result.job_details {
        Some(job) => error!(
            job_id,
            attempts = result.attempts,
            duration = %duration,
            state = %result.state,
            error = %error,
            pipelines_failed = job.pipelines_failed,
            pipelines_completed = job.pipelines_completed,
            job_status = %job.status,
            "{failed}"
        ),
        None => error!(
            job_id,
            attempts = result.attempts,
            duration = %duration,
            state = %result.state,
            error = %error,
            "{failed}"
        ),
    }
    exit_codes::FAILURE
}

pub async fn run_server(settings: &Settings, client: PipelineClient) -> i32 {
    info!("running in server mode");

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind HTTP listener");
            return exit_codes::FAILURE;
        }
    };

    let state = AppState::new(client);
    match server::serve(
        listener,
        state,
        settings.shutdown_timeout,
        shutdown::wait_for_signal(),
    )
    .await
    {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            error!(error = %e, "HTTP server error");
            exit_codes::FAILURE
        }
    }
}
