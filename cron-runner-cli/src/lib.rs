#![forbid(unsafe_code)]

//! The `cron-runner` frontends: HTTP service, one-shot and fire-and-forget.

pub mod args;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod modes;
pub mod server;
pub mod shutdown;
