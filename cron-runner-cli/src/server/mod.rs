mod handlers;

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use cron_runner_core::format_duration;
use cron_runner_exec::{CancellationToken, HealthState, PipelineClient};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use handlers::TriggerResponse;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<PipelineClient>,
    pub health: Arc<HealthState>,
    /// Process-wide token; each trigger runs under a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(client: PipelineClient) -> Self {
        Self {
            client: Arc::new(client),
            health: Arc::new(HealthState::new()),
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route(
            "/trigger",
            post(handlers::trigger).fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `signal` resolves or the state's token is cancelled, then drain.
///
/// Readiness flips off and in-flight triggers are cancelled before the listener closes.
/// Requests still running after `grace` are dropped.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    grace: Duration,
    signal: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let health = Arc::clone(&state.health);
    let token = state.shutdown.clone();
    let stop = token.clone();
    let app = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "HTTP server starting");
    }

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(stop.cancelled_owned())
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten(joined),
        _ = signal => info!("received shutdown signal, shutting down gracefully"),
        _ = token.cancelled() => info!("shutdown requested"),
    }

    health.set_ready(false).await;
    token.cancel();

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => {
            info!("server stopped");
            flatten(joined)
        }
        Err(_) => {
            warn!(grace = %format_duration(grace), "shutdown grace period elapsed, dropping in-flight requests");
            server.abort();
            Ok(())
        }
    }
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(io::Error::other(e)),
    }
}
