//! # Makescope Aggregation
//!
//! The hierarchical concurrent aggregation pipeline: a bounded-concurrency
//! fetch orchestrator that walks the organization → team → resource tree,
//! joins resources across endpoints, tolerates partial failures per
//! branch, emits progressively improving results, and supports
//! cancel-and-restart semantics.
//!
//! Two feeds are exposed: [`ScenarioHub`] for the full denormalized
//! scenario set, and [`OrgDirectory`] for the simpler organization/team
//! directory. Both publish their state over a `watch` channel and follow
//! the same pass lifecycle: hard refresh (clear, then progressive load)
//! or cache-first load (show the last snapshot, revalidate in the
//! background).

pub mod error;
pub mod orgs;
pub mod pool;
pub mod scenarios;

pub use error::{AggregateError, AggregateResult};
pub use orgs::{ORG_CACHE_KEY, OrgDirectory};
pub use pool::FetchPool;
pub use scenarios::{SCENARIO_CACHE_KEY, ScenarioHub};

/// Reactive view of one feed: the current result set, whether a pass is
/// still running, and the organizations skipped by the last pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub skipped_orgs: Vec<String>
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            skipped_orgs: Vec::new()
        }
    }
}
