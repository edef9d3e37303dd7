use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Wall-clock ceiling for the whole polling phase, independent of per-request timeouts.
    pub max_wait_time: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            max_wait_time: Duration::from_secs(3600),
        }
    }
}
