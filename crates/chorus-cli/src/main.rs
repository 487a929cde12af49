#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

use anyhow::Context;
use chorus_config::ChorusConfig;
use clap::Parser;

mod archive;
mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("chorus error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();

    let mut config = match flags.config.as_deref() {
        Some(path) => ChorusConfig::load_from(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => ChorusConfig::load_with_dotenv().context("failed to load configuration")?,
    };
    if let Some(database) = flags.database.clone() {
        config.database.path = database;
    }

    init_tracing(flags.quiet, flags.verbose, &config.log.level)?;

    let ctx = context::AppContext::init(config)
        .await
        .context("failed to initialize chorus application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool, configured: &str) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        configured
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CHORUS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
