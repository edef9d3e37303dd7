mod client;
mod config;
mod result;
mod state;

pub use client::{PipelineClient, JOB_STATUS_PATH, START_ALL_PATH};
pub use config::PollConfig;
pub use result::{PollOutcome, StartOutcome, TriggerError, TriggerResult};
pub use state::{next_poll_interval, PollSchedule, TriggerState};
