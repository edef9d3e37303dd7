use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle of a backend job as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Unknown => "unknown",
        }
    }

    /// `completed` and `failed` end polling; everything else keeps it going.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of a job fetched from `GET /v1/internal/pipelines/jobs/{job_id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub status: JobState,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub pipelines_total: u32,
    #[serde(default)]
    pub pipelines_completed: u32,
    #[serde(default)]
    pub pipelines_failed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pipeline: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, PipelineResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    /// A job counts as successful only when it completed and no pipeline failed.
    pub fn is_success(&self) -> bool {
        self.status == JobState::Completed && self.pipelines_failed == 0
    }

    /// Names of the pipelines whose result carries an error or a `failed` status.
    pub fn failed_pipelines(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| r.error.is_some() || r.status == "failed")
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    #[serde(default)]
    pub pipeline_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
