use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenarios(args) => commands::scenarios::run(args).await,
        Commands::Orgs(args) => commands::orgs::run(args).await,
        Commands::Logs(args) => commands::logs::run(args).await,
    }
}
