mod report;
mod state;

pub use report::{Checks, HealthReport, ReadinessReport};
pub use state::{HealthSnapshot, HealthState, PipelineRunStatus};

pub const SERVICE_NAME: &str = "cron-runner";
