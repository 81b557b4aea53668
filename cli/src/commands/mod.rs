pub mod logs;
pub mod orgs;
pub mod scenarios;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "makescope",
    author,
    version,
    about = "Browse Make scenarios across all organizations and teams",
    long_about = "Aggregates every organization, team and scenario your API token can see \
                  into one deduplicated, sorted list.\n\nConfigure via MAKESCOPE_API_TOKEN, \
                  MAKESCOPE_ZONE, MAKESCOPE_POOL_SIZE and MAKESCOPE_CACHE_DIR."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List scenarios across every organization and team")]
    Scenarios(scenarios::ScenariosArgs),

    #[command(about = "List organizations and their teams")]
    Orgs(orgs::OrgsArgs),

    #[command(about = "Show execution and edit history for one scenario")]
    Logs(logs::LogsArgs)
}
