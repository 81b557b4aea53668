use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full regional API domain an organization's data lives behind,
/// e.g. `eu1.make.com`.
pub type Zone = String;

/// Top-level tenant unit. Each organization is bound to exactly one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub zone: Zone
}

/// Sub-unit of an organization owning scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub organization_id: i64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String
}

/// An automation workflow definition, the platform's leaf work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Lowercase spelling matches the API response field name.
    #[serde(default)]
    pub islinked: bool,
    #[serde(default)]
    pub is_paused: bool,
    pub team_id: i64,
    #[serde(default)]
    pub hook_id: Option<i64>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    pub last_edit: DateTime<Utc>,
    #[serde(default)]
    pub updated_by_user: Option<User>
}

/// Webhook trigger resource. Only hooks with a non-empty `url` are usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub id: i64,
    #[serde(default)]
    pub url: String
}

/// Optional scenario grouping referenced by `Scenario::folder_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i64,
    pub name: String
}

/// Denormalized join record produced by the aggregation pipeline: one
/// scenario together with its owning team and organization, plus the
/// resolved folder and webhook URL (both nullable per the join rules).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioItem {
    pub scenario: Scenario,
    pub team: Team,
    pub org: Organization,
    pub folder: Option<Folder>,
    pub webhook_url: Option<String>
}

impl ScenarioItem {
    /// Identity key used for deduplication. Unique across the final
    /// result set of one aggregation pass.
    pub fn identity_key(&self) -> (&str, i64, i64, i64) {
        (&self.org.zone, self.org.id, self.team.id, self.scenario.id)
    }
}

/// One row of the simpler organization/team directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgTeamItem {
    pub org: Organization,
    pub team: Team
}

/// Execution or edit history entry for one scenario.
///
/// Status values 1 (success), 2 (warning) and 3 (error) mark execution
/// runs; anything else is an edit-style entry attributed via `author_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioLog {
    pub imt_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: i64,
    pub timestamp: DateTime<Utc>,
    /// Run duration in milliseconds.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub operations: i64,
    /// Bytes transferred during the run.
    #[serde(default)]
    pub transfer: i64,
    #[serde(default)]
    pub centicredits: i64,
    #[serde(default)]
    pub author_id: i64
}

impl ScenarioLog {
    pub fn is_execution(&self) -> bool {
        matches!(self.status, 1..=3)
    }
}

/// Persisted form of the last successful scenario aggregation pass.
/// Overwritten wholesale at the end of every successful pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedScenarios {
    pub items: Vec<ScenarioItem>,
    pub skipped_orgs: Vec<String>,
    pub user_id: i64
}

/// Persisted form of the last successful organization/team pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedOrgDirectory {
    pub items: Vec<OrgTeamItem>,
    pub skipped_orgs: Vec<String>
}
