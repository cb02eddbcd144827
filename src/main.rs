use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use provisioner::dispatcher::{self, Collaborators};
use provisioner::{Cli, Config, interrupt};

// The environment is mutated while publishing credentials; keep one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let deps = Collaborators::aws(&config, interrupt::watch_ctrl_c()).await?;

    let mut stdout = std::io::stdout();
    let outcome = dispatcher::run(cli.command, &config, &deps, &mut stdout).await?;

    Ok(outcome.exit_code(cli.fail_on_error))
}
