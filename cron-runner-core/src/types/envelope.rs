use serde::{Deserialize, Serialize};

use crate::types::job::{JobState, JobStatus};

/// Body of a successful `POST /v1/internal/pipelines/all`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobCreatedResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: JobCreated,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobCreated {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub status: JobState,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub pipelines_total: u32,
}

/// Body of a successful `GET /v1/internal/pipelines/jobs/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: JobStatus,
}
