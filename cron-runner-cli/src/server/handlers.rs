use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cron_runner_core::format_duration;
use cron_runner_exec::{HealthReport, ReadinessReport, TriggerResult, SERVICE_NAME};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TriggerResponse {
    Success {
        job_id: String,
        attempts: u32,
        duration: String,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
        state: String,
        attempts: u32,
        duration: String,
        status_code: Option<u16>,
        error: String,
    },
}

impl From<TriggerResult> for TriggerResponse {
    fn from(result: TriggerResult) -> Self {
        let duration = format_duration(result.duration);
        if result.success {
            return TriggerResponse::Success {
                job_id: result.job_id.unwrap_or_default(),
                attempts: result.attempts,
                duration,
            };
        }
        TriggerResponse::Failed {
            error: result.error_message().unwrap_or_default(),
            job_id: result.job_id,
            state: result.state.to_string(),
            attempts: result.attempts,
            duration,
            status_code: result.status_code,
        }
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.health_report().await)
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let report = state.health.readiness_report().await;
    let code = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

/// Runs the trigger on its own task so a dropped connection cannot abort tracking
/// or the health record.
pub async fn trigger(State(state): State<AppState>) -> (StatusCode, Json<TriggerResponse>) {
    info!("received trigger request");

    let client = state.client.clone();
    let health = state.health.clone();
    let cancel = state.shutdown.child_token();
    let task = tokio::spawn(async move {
        let result = client.trigger_all(&cancel).await;
        health.record_trigger(&result).await;
        result
    });

    match task.await {
        Ok(result) => {
            let code = if result.success {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (code, Json(result.into()))
        }
        Err(e) => {
            error!(error = %e, "trigger task failed");
            let body = TriggerResponse::Failed {
                job_id: None,
                state: "unknown".to_string(),
                attempts: 0,
                duration: format_duration(std::time::Duration::ZERO),
                status_code: None,
                error: e.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
    }
}

pub async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "method not allowed"})),
    )
}
