use crate::output;
use anyhow::Result;
use clap::Args;
use client::ApiClient;
use config::Config;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use validator::Validate;

#[derive(Args)]
pub struct LogsArgs {
    /// Zone the scenario's organization lives in, e.g. eu1.make.com
    pub zone: String,

    /// Team owning the scenario
    pub team_id: i64,

    /// Scenario to show history for
    pub scenario_id: i64
}

pub async fn run(args: LogsArgs) -> Result<()> {
    let config = Config::detect_env();
    config.validate()?;

    let client = ApiClient::new(&config)?;
    let cancel = CancellationToken::new();

    let (logs, users) = tokio::try_join!(
        client.scenario_logs(&args.zone, args.scenario_id),
        client.users(&args.zone, args.team_id, &cancel)
    )?;

    let user_names: HashMap<i64, String> =
        users.into_iter().map(|user| (user.id, user.name)).collect();
    output::print_logs(&logs, &user_names, &args.zone, args.team_id, args.scenario_id);
    Ok(())
}
