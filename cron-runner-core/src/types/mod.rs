mod envelope;
mod job;

pub use envelope::{JobCreated, JobCreatedResponse, JobStatusResponse};
pub use job::{JobState, JobStatus, PipelineResult};
