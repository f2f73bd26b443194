use std::error::Error;
use std::io;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pvp_tracker::cli::{self, Args, CliContext};

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they never interleave with prompt output.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut ctx = CliContext::from_args(&args)?;
    tracing::info!(storage_dir = %ctx.settings.storage_dir.display(), "Fight tracker started");

    let stdin = io::stdin();
    cli::run(&mut ctx, &mut stdin.lock(), &mut io::stdout())?;
    Ok(())
}
