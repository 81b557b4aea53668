use crate::output;
use aggregate::ScenarioHub;
use anyhow::Result;
use clap::Args;
use client::ApiClient;
use config::Config;
use std::sync::Arc;
use storage::FileStore;
use validator::Validate;

#[derive(Args)]
pub struct ScenariosArgs {
    /// Bypass the cached snapshot and reload everything from the API
    #[arg(long)]
    pub refresh: bool,

    /// Print editor and webhook deep links for each scenario
    #[arg(long)]
    pub urls: bool
}

pub async fn run(args: ScenariosArgs) -> Result<()> {
    let config = Config::detect_env();
    config.validate()?;

    let client = Arc::new(ApiClient::new(&config)?);
    let store = Arc::new(FileStore::new(config.cache_dir.clone()));
    let hub = ScenarioHub::new(client, store, config.pool_size);

    if args.refresh {
        hub.refresh().await?;
    } else {
        hub.start().await?;
    }

    let state = hub.subscribe().borrow().clone();
    output::print_scenarios(&state, args.urls);
    Ok(())
}
