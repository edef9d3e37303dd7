use clap::Parser;
use cron_runner_cli::args::Cli;
use cron_runner_cli::{config, exit_codes, logging, modes};
use cron_runner_core::{format_duration, Settings};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(exit_codes::FAILURE);
        }
    };

    logging::init(settings.log_level, settings.log_json);
    info!(
        backend_url = %settings.backend_url,
        port = settings.port,
        max_retries = settings.max_retries,
        initial_backoff = %format_duration(settings.initial_backoff),
        max_backoff = %format_duration(settings.max_backoff),
        backoff_factor = settings.backoff_factor,
        request_timeout = %format_duration(settings.request_timeout),
        poll_initial_interval = %format_duration(settings.poll_initial_interval),
        poll_max_interval = %format_duration(settings.poll_max_interval),
        poll_max_wait_time = %format_duration(settings.poll_max_wait_time),
        "cron-runner starting"
    );

    let client = match config::build_client(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build pipeline client");
            std::process::exit(exit_codes::FAILURE);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::FAILURE);
        }
    };

    let code = rt.block_on(modes::run(cli.mode(), &settings, client));
    std::process::exit(code);
}
