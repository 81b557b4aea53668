//! # Makescope Core
//!
//! Domain types shared across the Makescope workspace: the wire-level
//! resources returned by the Make API, the denormalized join records
//! produced by the aggregation pipeline, and the cached snapshot formats.

pub mod types;

pub use types::{
    CachedOrgDirectory, CachedScenarios, Folder, Hook, OrgTeamItem, Organization, Scenario,
    ScenarioItem, ScenarioLog, Team, User, Zone,
};
