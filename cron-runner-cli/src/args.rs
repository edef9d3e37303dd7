use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cron-runner", version, about = "Trigger backend data pipelines")]
pub struct Cli {
    /// Trigger all pipelines once, wait for the job to finish, then exit.
    #[arg(long)]
    pub once: bool,

    /// With --once: exit as soon as the job has been started.
    #[arg(long, requires = "once")]
    pub fire_and_forget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Server,
    Once,
    FireAndForget,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (self.once, self.fire_and_forget) {
            (true, true) => Mode::FireAndForget,
            (true, false) => Mode::Once,
            _ => Mode::Server,
        }
    }
}
