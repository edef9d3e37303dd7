use std::time::Duration;

use chrono::{DateTime, Utc};
use cron_runner_core::format_duration;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::health::report::{Checks, HealthReport, ReadinessReport};
use crate::pipeline::TriggerResult;

/// Outcome of the most recent trigger, as `/health` reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRunStatus {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub duration: String,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub ready: bool,
    pub last_pipeline_run: Option<PipelineRunStatus>,
}

#[derive(Debug)]
struct Inner {
    ready: bool,
    shutting_down: bool,
    last_pipeline_run: Option<PipelineRunStatus>,
}

/// Readiness and last-run record shared between the server and the trigger tasks.
///
/// Readers copy out under the read lock; nothing holds the lock across trigger work.
#[derive(Debug)]
pub struct HealthState {
    inner: RwLock<Inner>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                ready: true,
                shutting_down: false,
                last_pipeline_run: None,
            }),
        }
    }

    /// Once set to `false` readiness stays off for the life of the process.
    pub async fn set_ready(&self, ready: bool) {
        let mut inner = self.inner.write().await;
        if ready && inner.shutting_down {
            return;
        }
        inner.ready = ready;
        if !ready {
            inner.shutting_down = true;
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.ready
    }

    pub async fn record_pipeline_run(
        &self,
        success: bool,
        duration: Duration,
        attempts: u32,
        error: Option<String>,
    ) {
        let run = PipelineRunStatus {
            success,
            timestamp: Utc::now(),
            duration: format_duration(duration),
            attempts,
            error,
        };
        self.inner.write().await.last_pipeline_run = Some(run);
    }

    pub async fn record_trigger(&self, result: &TriggerResult) {
        self.record_pipeline_run(
            result.success,
            result.duration,
            result.attempts,
            result.error_message(),
        )
        .await;
    }

    pub async fn last_pipeline_run(&self) -> Option<PipelineRunStatus> {
        self.inner.read().await.last_pipeline_run.clone()
    }

    pub async fn snapshot(&self) -> HealthSnapshot {
        let inner = self.inner.read().await;
        HealthSnapshot {
            ready: inner.ready,
            last_pipeline_run: inner.last_pipeline_run.clone(),
        }
    }

    pub async fn health_report(&self) -> HealthReport {
        let last = self.last_pipeline_run().await;
        HealthReport::healthy(last.map(|run| Checks {
            last_pipeline_run: Some(run),
        }))
    }

    pub async fn readiness_report(&self) -> ReadinessReport {
        ReadinessReport::new(self.is_ready().await)
    }
}
