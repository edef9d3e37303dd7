use std::time::Duration;

use tokio::time::Instant;

use crate::pipeline::config::PollConfig;

/// States of one trigger, from `NotStarted` to a terminal outcome.
///
/// ```text
/// NotStarted -> Starting -> StartFailed
///                        -> Started -> Polling -> Completed | Failed | TimedOut | PollError | Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    NotStarted,
    Starting,
    StartFailed,
    Started,
    Polling,
    Completed,
    Failed,
    TimedOut,
    PollError,
    Cancelled,
}

impl TriggerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerState::NotStarted => "not_started",
            TriggerState::Starting => "starting",
            TriggerState::StartFailed => "start_failed",
            TriggerState::Started => "started",
            TriggerState::Polling => "polling",
            TriggerState::Completed => "completed",
            TriggerState::Failed => "failed",
            TriggerState::TimedOut => "timed_out",
            TriggerState::PollError => "poll_error",
            TriggerState::Cancelled => "cancelled",
        }
    }

    /// `Started` is terminal only for fire-and-forget; `trigger_all` moves on to `Polling`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TriggerState::StartFailed
                | TriggerState::Completed
                | TriggerState::Failed
                | TriggerState::TimedOut
                | TriggerState::PollError
                | TriggerState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: TriggerState) -> bool {
        use TriggerState::*;
        matches!(
            (self, next),
            (NotStarted, Starting)
                | (Starting, StartFailed)
                | (Starting, Started)
                | (Started, Polling)
                | (Polling, Completed)
                | (Polling, Failed)
                | (Polling, TimedOut)
                | (Polling, PollError)
                | (Polling, Cancelled)
        )
    }
}

impl std::fmt::Display for TriggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grow a poll interval by 1.5x, capped at `max`.
pub fn next_poll_interval(current: Duration, max: Duration) -> Duration {
    (current.saturating_mul(3) / 2).min(max)
}

/// Interval and deadline bookkeeping for one polling phase.
///
/// The deadline is fixed when polling starts and is never pushed back.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    max_interval: Duration,
    deadline: Instant,
}

impl PollSchedule {
    pub fn start(cfg: &PollConfig, now: Instant) -> Self {
        Self {
            interval: cfg.initial_interval,
            max_interval: cfg.max_interval,
            deadline: now + cfg.max_wait_time,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.deadline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Return the wait for this cycle and grow the interval for the next one.
    pub fn advance(&mut self) -> Duration {
        let wait = self.interval;
        self.interval = next_poll_interval(self.interval, self.max_interval);
        wait
    }
}
