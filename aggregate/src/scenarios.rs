//! Full-hierarchy aggregation: organizations → teams → scenarios,
//! folders and hooks, joined into denormalized [`ScenarioItem`] records.
//!
//! Each pass owns its accumulation buffer exclusively: per-organization
//! branch tasks send their outcome over a channel to a single reducer,
//! so progressive publication never races branch completions. Starting
//! a new pass cancels the in-flight one before touching shared state.

use crate::error::AggregateResult;
use crate::pool::FetchPool;
use crate::FeedState;
use client::ApiClient;
use ms_core::{CachedScenarios, Folder, Hook, Organization, Scenario, ScenarioItem, Team};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use storage::BlobStore;
use tokio::sync::{mpsc, watch, Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const SCENARIO_CACHE_KEY: &str = "scenarios-cache-v1";

enum OrgOutcome {
    /// The organization's team list resolved. `team_failures` marks
    /// branches below the team level that failed and were dropped.
    Loaded {
        org_name: String,
        items: Vec<ScenarioItem>,
        team_failures: bool
    },
    /// The organization's team list itself could not be fetched.
    Skipped { name: String }
}

pub struct ScenarioHub {
    client: Arc<ApiClient>,
    store: Arc<dyn BlobStore>,
    pool: FetchPool,
    /// Resolved once per process lifetime; identity never changes
    /// between passes.
    user_id: OnceCell<i64>,
    state: watch::Sender<FeedState<ScenarioItem>>,
    current_pass: Mutex<Option<CancellationToken>>
}

impl ScenarioHub {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn BlobStore>, pool_size: usize) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            client,
            store,
            pool: FetchPool::new(pool_size),
            user_id: OnceCell::new(),
            state,
            current_pass: Mutex::new(None)
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<ScenarioItem>> {
        self.state.subscribe()
    }

    /// Hard refresh: clears the visible result and skip list, then runs
    /// a full pass with progressive publication. Supersedes any
    /// in-flight pass.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> AggregateResult<()> {
        let cancel = self.begin_pass().await;
        self.run_hard(&cancel).await
    }

    /// Cache-first load: shows the last snapshot immediately (loading
    /// indicator stays active) and revalidates in the background,
    /// publishing only the completed result. Falls back to a hard
    /// refresh when no snapshot exists.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> AggregateResult<()> {
        let cancel = self.begin_pass().await;

        let Some(cached) = self.read_cache().await else {
            return self.run_hard(&cancel).await;
        };
        if cancel.is_cancelled() {
            return Ok(());
        }

        let _ = self.user_id.set(cached.user_id);
        self.state.send_replace(FeedState {
            items: cached.items,
            is_loading: true,
            skipped_orgs: cached.skipped_orgs
        });

        if let Err(err) = self.run_pass(&cancel, true).await
            && !cancel.is_cancelled()
        {
            warn!(error = %err, "Background refresh failed; keeping cached data");
            self.state.send_modify(|state| state.is_loading = false);
        }
        Ok(())
    }

    /// Cancels any in-flight pass. Called on caller teardown.
    pub async fn shutdown(&self) {
        if let Some(cancel) = self.current_pass.lock().await.take() {
            cancel.cancel();
        }
    }

    /// Supersedes the current pass: cancels it and installs a fresh
    /// token, so at most one pass ever mutates shared state.
    async fn begin_pass(&self) -> CancellationToken {
        let mut current = self.current_pass.lock().await;
        if let Some(prior) = current.take() {
            prior.cancel();
        }
        let cancel = CancellationToken::new();
        *current = Some(cancel.clone());
        cancel
    }

    async fn run_hard(&self, cancel: &CancellationToken) -> AggregateResult<()> {
        self.state.send_replace(FeedState {
            items: Vec::new(),
            is_loading: true,
            skipped_orgs: Vec::new()
        });
        match self.run_pass(cancel, false).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if cancel.is_cancelled() {
                    return Ok(());
                }
                self.state.send_modify(|state| state.is_loading = false);
                Err(err)
            }
        }
    }

    async fn current_user(&self) -> client::ApiResult<i64> {
        self.user_id
            .get_or_try_init(|| self.client.current_user_id())
            .await
            .copied()
    }

    /// One full aggregation pass. User-id and organization resolution
    /// are pass-fatal; everything below is isolated per organization.
    /// In background mode only the completed result is published.
    async fn run_pass(&self, cancel: &CancellationToken, background: bool) -> AggregateResult<()> {
        let my_user_id = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            result = self.current_user() => result?,
        };

        let orgs = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            result = self.client.organizations(cancel) => result?,
        };
        if cancel.is_cancelled() {
            return Ok(());
        }
        info!(organizations = orgs.len(), "Resolved organization list");

        if orgs.is_empty() {
            self.state.send_replace(FeedState {
                items: Vec::new(),
                is_loading: false,
                skipped_orgs: Vec::new()
            });
            self.write_cache(&CachedScenarios {
                items: Vec::new(),
                skipped_orgs: Vec::new(),
                user_id: my_user_id
            })
            .await;
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        for org in orgs {
            tokio::spawn(load_org(
                Arc::clone(&self.client),
                self.pool.clone(),
                org,
                cancel.clone(),
                tx.clone()
            ));
        }
        drop(tx);

        // Single-writer reducer: this loop exclusively owns the
        // accumulation buffer for the whole pass.
        let mut fresh: Vec<ScenarioItem> = Vec::new();
        let mut skipped: BTreeSet<String> = BTreeSet::new();

        while let Some(outcome) = rx.recv().await {
            if cancel.is_cancelled() {
                return Ok(());
            }
            match outcome {
                OrgOutcome::Loaded {
                    org_name,
                    items,
                    team_failures
                } => {
                    if team_failures {
                        skipped.insert(org_name);
                    }
                    if !items.is_empty() {
                        fresh.extend(items);
                        if !background {
                            self.state.send_replace(FeedState {
                                items: sort_items(dedup_items(fresh.clone()), my_user_id),
                                is_loading: true,
                                skipped_orgs: skipped.iter().cloned().collect()
                            });
                        }
                    }
                }
                OrgOutcome::Skipped { name } => {
                    skipped.insert(name);
                }
            }
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        let final_items = sort_items(dedup_items(fresh), my_user_id);
        let skipped_orgs: Vec<String> = skipped.into_iter().collect();
        info!(
            items = final_items.len(),
            skipped = skipped_orgs.len(),
            "Aggregation pass complete"
        );
        self.state.send_replace(FeedState {
            items: final_items.clone(),
            is_loading: false,
            skipped_orgs: skipped_orgs.clone()
        });
        self.write_cache(&CachedScenarios {
            items: final_items,
            skipped_orgs,
            user_id: my_user_id
        })
        .await;
        Ok(())
    }

    async fn read_cache(&self) -> Option<CachedScenarios> {
        match self.store.get(SCENARIO_CACHE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "Cache read failed");
                None
            }
        }
    }

    async fn write_cache(&self, snapshot: &CachedScenarios) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "Cache serialization failed");
                return;
            }
        };
        if let Err(err) = self.store.set(SCENARIO_CACHE_KEY, &raw).await {
            warn!(error = %err, "Cache write failed");
        }
    }
}

/// One organization branch: resolve teams, then fan out per team over
/// the shared pool, join each team's resources, and report the outcome
/// to the reducer. Never sends after cancellation.
async fn load_org(
    client: Arc<ApiClient>,
    pool: FetchPool,
    org: Organization,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<OrgOutcome>
) {
    let teams = pool.run(client.teams(&org.zone, org.id, &cancel)).await;
    if cancel.is_cancelled() {
        return;
    }

    let teams = match teams {
        Ok(teams) => teams,
        Err(err) => {
            warn!(org = %org.name, error = %err, "Skipping organization: team fetch failed");
            let _ = tx.send(OrgOutcome::Skipped { name: org.name });
            return;
        }
    };

    let team_futures = teams.into_iter().map(|team| {
        let client = Arc::clone(&client);
        let pool = pool.clone();
        let cancel = cancel.clone();
        let org = org.clone();
        async move {
            pool.run(async {
                tokio::try_join!(
                    client.scenarios(&org.zone, team.id, &cancel),
                    client.folders(&org.zone, team.id, &cancel),
                    client.hooks(&org.zone, team.id, &cancel)
                )
            })
            .await
            .map(|(scenarios, folders, hooks)| {
                join_team_items(&org, &team, scenarios, folders, hooks)
            })
        }
    });
    let results = futures_util::future::join_all(team_futures).await;
    if cancel.is_cancelled() {
        return;
    }

    let mut items = Vec::new();
    let mut team_failures = false;
    for result in results {
        match result {
            Ok(batch) => items.extend(batch),
            Err(err) => {
                warn!(org = %org.name, error = %err, "Team resource fetch failed");
                team_failures = true;
            }
        }
    }
    let _ = tx.send(OrgOutcome::Loaded {
        org_name: org.name,
        items,
        team_failures
    });
}

/// Joins one team's scenarios with its folder and hook sets. A broken
/// folder reference resolves to `None`; only hooks with a non-empty url
/// participate in webhook resolution.
fn join_team_items(
    org: &Organization,
    team: &Team,
    scenarios: Vec<Scenario>,
    folders: Vec<Folder>,
    hooks: Vec<Hook>
) -> Vec<ScenarioItem> {
    let folder_map: HashMap<i64, Folder> =
        folders.into_iter().map(|folder| (folder.id, folder)).collect();
    let hook_map: HashMap<i64, Hook> = hooks
        .into_iter()
        .filter(|hook| !hook.url.is_empty())
        .map(|hook| (hook.id, hook))
        .collect();

    scenarios
        .into_iter()
        .map(|scenario| {
            let folder = scenario
                .folder_id
                .and_then(|id| folder_map.get(&id).cloned());
            let webhook_url = scenario
                .hook_id
                .and_then(|id| hook_map.get(&id).map(|hook| hook.url.clone()));
            ScenarioItem {
                scenario,
                team: team.clone(),
                org: org.clone(),
                folder,
                webhook_url
            }
        })
        .collect()
}

/// First occurrence wins on the identity key.
fn dedup_items(items: Vec<ScenarioItem>) -> Vec<ScenarioItem> {
    let mut seen: HashSet<(String, i64, i64, i64)> = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let (zone, org_id, team_id, scenario_id) = item.identity_key();
            seen.insert((zone.to_string(), org_id, team_id, scenario_id))
        })
        .collect()
}

/// The current user's own edits first, then last-edit descending within
/// each group.
fn sort_items(mut items: Vec<ScenarioItem>, my_user_id: i64) -> Vec<ScenarioItem> {
    items.sort_by(|a, b| {
        let a_mine = a
            .scenario
            .updated_by_user
            .as_ref()
            .is_some_and(|user| user.id == my_user_id);
        let b_mine = b
            .scenario
            .updated_by_user
            .as_ref()
            .is_some_and(|user| user.id == my_user_id);
        b_mine
            .cmp(&a_mine)
            .then_with(|| b.scenario.last_edit.cmp(&a.scenario.last_edit))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ms_core::User;

    fn org() -> Organization {
        Organization {
            id: 1,
            name: "Acme".into(),
            zone: "eu1.make.com".into()
        }
    }

    fn team(id: i64) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            organization_id: 1
        }
    }

    fn scenario(id: i64, hours_ago: i64, editor: Option<i64>) -> Scenario {
        Scenario {
            id,
            name: format!("Scenario {id}"),
            description: String::new(),
            islinked: true,
            is_paused: false,
            team_id: 10,
            hook_id: None,
            folder_id: None,
            last_edit: Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap()
                - chrono::Duration::hours(hours_ago),
            updated_by_user: editor.map(|id| User {
                id,
                name: String::new(),
                email: String::new()
            })
        }
    }

    fn item(scenario_id: i64, hours_ago: i64, editor: Option<i64>) -> ScenarioItem {
        ScenarioItem {
            scenario: scenario(scenario_id, hours_ago, editor),
            team: team(10),
            org: org(),
            folder: None,
            webhook_url: None
        }
    }

    #[test]
    fn join_resolves_folder_and_webhook_per_invariants() {
        let folders = vec![Folder {
            id: 3,
            name: "Billing".into()
        }];
        let hooks = vec![
            Hook {
                id: 5,
                url: "https://hook.example.com/abc".into()
            },
            Hook {
                id: 6,
                url: String::new()
            },
        ];
        let mut with_folder = scenario(1, 0, None);
        with_folder.folder_id = Some(3);
        let mut with_hook = scenario(2, 0, None);
        with_hook.hook_id = Some(5);
        let mut with_empty_hook = scenario(3, 0, None);
        with_empty_hook.hook_id = Some(6);
        let mut broken_folder = scenario(4, 0, None);
        broken_folder.folder_id = Some(99);

        let items = join_team_items(
            &org(),
            &team(10),
            vec![with_folder, with_hook, with_empty_hook, broken_folder],
            folders,
            hooks
        );

        assert_eq!(items[0].folder.as_ref().unwrap().name, "Billing");
        assert_eq!(
            items[1].webhook_url.as_deref(),
            Some("https://hook.example.com/abc")
        );
        // Empty hook url and dangling folder id both resolve to null.
        assert!(items[2].webhook_url.is_none());
        assert!(items[3].folder.is_none());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let items = vec![item(1, 0, None), item(2, 0, None), item(1, 5, Some(9))];
        let deduped = dedup_items(items);
        assert_eq!(deduped.len(), 2);
        // First occurrence of scenario 1 wins.
        assert!(deduped[0].scenario.updated_by_user.is_none());
    }

    #[test]
    fn dedup_distinguishes_teams() {
        let mut other_team = item(1, 0, None);
        other_team.team = team(11);
        let deduped = dedup_items(vec![item(1, 0, None), other_team]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn sort_puts_own_edits_first_then_recency() {
        let sorted = sort_items(
            vec![
                item(1, 1, None),
                item(2, 10, Some(7)),
                item(3, 2, Some(8)),
                item(4, 3, Some(7)),
            ],
            7
        );
        let ids: Vec<i64> = sorted.iter().map(|i| i.scenario.id).collect();
        // Items edited by user 7 first (most recent of them leading),
        // then the rest by recency.
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }
}
