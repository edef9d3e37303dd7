use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::state::PipelineRunStatus;
use crate::health::SERVICE_NAME;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Checks>,
}

impl HealthReport {
    pub fn healthy(checks: Option<Checks>) -> Self {
        Self {
            status: "healthy",
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            checks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Checks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pipeline_run: Option<PipelineRunStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub ready: bool,
}

impl ReadinessReport {
    pub fn new(ready: bool) -> Self {
        Self {
            status: if ready { "ready" } else { "not_ready" },
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            ready,
        }
    }
}
