use aggregate::FeedState;
use colored::Colorize;
use ms_core::{OrgTeamItem, ScenarioItem, ScenarioLog};
use std::collections::HashMap;
use utils::{
    format_bytes, format_duration, format_timestamp, org_scenarios_url, scenario_log_url,
    scenario_url, zone_label,
};

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn print_scenarios(state: &FeedState<ScenarioItem>, urls: bool) {
    header(&format!("{} scenarios", state.items.len()));

    for item in &state.items {
        let zone_tag = format!("[{}]", zone_label(&item.org.zone));
        let mut line = format!("{} {}", zone_tag.dimmed(), item.scenario.name.bold());
        if item.scenario.is_paused {
            line.push_str(&format!(" {}", "(paused)".yellow()));
        }
        if !item.scenario.islinked {
            line.push_str(&format!(" {}", "(draft)".dimmed()));
        }
        println!("{line}");

        let mut context = format!("  {} / {}", item.org.name, item.team.name);
        if let Some(folder) = &item.folder {
            context.push_str(&format!(" · {}", folder.name));
        }
        context.push_str(&format!(" · {}", format_timestamp(&item.scenario.last_edit)));
        println!("{}", context.dimmed());

        if urls {
            println!(
                "  {}",
                scenario_url(&item.org.zone, item.team.id, item.scenario.id).cyan()
            );
            if let Some(webhook) = &item.webhook_url {
                println!("  {}", webhook.cyan());
            }
        }
    }

    for name in &state.skipped_orgs {
        warn(&format!("{name}: organization skipped, data unavailable"));
    }
}

pub fn print_org_directory(state: &FeedState<OrgTeamItem>) {
    header(&format!("{} teams", state.items.len()));

    for item in &state.items {
        println!(
            "{} {} / {}",
            format!("[{}]", zone_label(&item.org.zone)).dimmed(),
            item.org.name.bold(),
            item.team.name
        );
        println!(
            "  {}",
            org_scenarios_url(&item.org.zone, item.team.id).dimmed()
        );
    }

    for name in &state.skipped_orgs {
        warn(&format!("{name}: organization skipped, data unavailable"));
    }
}

pub fn print_logs(
    logs: &[ScenarioLog],
    user_names: &HashMap<i64, String>,
    zone: &ms_core::Zone,
    team_id: i64,
    scenario_id: i64
) {
    header(&format!("{} log entries", logs.len()));

    for log in logs {
        let url = scenario_log_url(zone, team_id, scenario_id, &log.imt_id);

        if log.is_execution() {
            let status = match log.status {
                1 => "Success".green(),
                2 => "Warning".yellow(),
                _ => "Error".red()
            };
            let mut accessories = Vec::new();
            if log.operations > 0 {
                accessories.push(format!("{} ops", log.operations));
            }
            if log.centicredits > 0 {
                accessories.push(format!("{} cr", log.centicredits as f64 / 100.0));
            }
            if log.transfer > 0 {
                accessories.push(format_bytes(log.transfer.max(0) as u64));
            }
            println!(
                "{} {} {} {}",
                status,
                format_timestamp(&log.timestamp),
                format_duration(log.duration.max(0) as u64).dimmed(),
                accessories.join(" · ").dimmed()
            );
        } else {
            let author = user_names
                .get(&log.author_id)
                .map(String::as_str)
                .unwrap_or("unknown");
            println!(
                "{} {} {} {}",
                "Edit".blue(),
                format_timestamp(&log.timestamp),
                log.kind.dimmed(),
                author.dimmed()
            );
        }
        println!("  {}", url.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_does_not_panic() {
        header("Test Header");
    }

    #[test]
    fn warn_does_not_panic() {
        warn("something went sideways");
    }

    #[test]
    fn empty_feed_prints_cleanly() {
        let state: FeedState<ScenarioItem> = FeedState {
            items: vec![],
            is_loading: false,
            skipped_orgs: vec!["Acme".into()]
        };
        print_scenarios(&state, false);
    }
}
