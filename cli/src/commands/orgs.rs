use crate::output;
use aggregate::OrgDirectory;
use anyhow::Result;
use clap::Args;
use client::ApiClient;
use config::Config;
use std::sync::Arc;
use storage::FileStore;
use validator::Validate;

#[derive(Args)]
pub struct OrgsArgs {
    /// Bypass the cached snapshot and reload everything from the API
    #[arg(long)]
    pub refresh: bool
}

pub async fn run(args: OrgsArgs) -> Result<()> {
    let config = Config::detect_env();
    config.validate()?;

    let client = Arc::new(ApiClient::new(&config)?);
    let store = Arc::new(FileStore::new(config.cache_dir.clone()));
    let directory = OrgDirectory::new(client, store, config.pool_size);

    if args.refresh {
        directory.refresh().await?;
    } else {
        directory.start().await?;
    }

    let state = directory.subscribe().borrow().clone();
    output::print_org_directory(&state);
    Ok(())
}
