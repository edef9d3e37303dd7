#![forbid(unsafe_code)]

pub mod duration;
pub mod error;
pub mod settings;
pub mod types;

pub use crate::duration::{format_duration, parse_duration};
pub use crate::error::{ConfigError, DurationParseError};
pub use crate::settings::{LogLevel, Settings};
pub use crate::types::{
    JobCreated, JobCreatedResponse, JobState, JobStatus, JobStatusResponse, PipelineResult,
};
