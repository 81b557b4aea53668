//! # Makescope Utilities
//!
//! Pure helper functions: human-readable formatting for durations,
//! timestamps and byte sizes, plus deep-link URL construction into the
//! Make web UI.

use chrono::{DateTime, Datelike, Local, Utc};
use ms_core::Zone;

/// Formats a millisecond duration: `850ms`, `12.3s`, `3m 5s`, `3m`.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let seconds = ms as f64 / 1000.0;
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let remaining = (seconds % 60.0).round() as u64;
    if remaining > 0 {
        format!("{minutes}m {remaining}s")
    } else {
        format!("{minutes}m")
    }
}

/// Formats a byte count: `0 B`, `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    if bytes < 1024 * 1024 {
        return format!("{:.1} KB", bytes as f64 / 1024.0);
    }
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Relative timestamp in the local timezone: `Today at 3:04 PM`,
/// `Yesterday at 9:12 AM`, otherwise `Nov 3, 2:21 PM`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    format_timestamp_at(ts.with_timezone(&Local), Local::now())
}

fn format_timestamp_at(ts: DateTime<Local>, now: DateTime<Local>) -> String {
    let time = ts.format("%-I:%M %p");
    if ts.date_naive() == now.date_naive() {
        return format!("Today at {time}");
    }
    if now
        .date_naive()
        .pred_opt()
        .is_some_and(|yesterday| yesterday == ts.date_naive())
    {
        return format!("Yesterday at {time}");
    }
    let month = ts.format("%b");
    format!("{month} {}, {time}", ts.day())
}

/// Extracts the short zone label, e.g. `eu1.make.com` → `eu1`.
pub fn zone_label(zone: &str) -> &str {
    zone.split('.').next().unwrap_or(zone)
}

/// Editor deep link for one scenario.
pub fn scenario_url(zone: &Zone, team_id: i64, scenario_id: i64) -> String {
    format!("https://{zone}/{team_id}/scenarios/{scenario_id}/edit")
}

/// Team-level scenario list, sorted the way the aggregation sorts.
pub fn org_scenarios_url(zone: &Zone, team_id: i64) -> String {
    format!("https://{zone}/{team_id}/scenarios?folder=all&tab=all&type=scenario&sort=lastEdited")
}

/// Detail view of one execution/edit log entry.
pub fn scenario_log_url(zone: &Zone, team_id: i64, scenario_id: i64, imt_id: &str) -> String {
    format!("https://{zone}/{team_id}/scenarios/{scenario_id}/logs/{imt_id}")
}
