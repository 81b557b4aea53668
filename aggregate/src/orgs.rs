//! Organization/team directory: the first two hierarchy levels only,
//! with the same pass lifecycle as the full scenario feed.

use crate::error::AggregateResult;
use crate::pool::FetchPool;
use crate::FeedState;
use client::ApiClient;
use ms_core::{CachedOrgDirectory, OrgTeamItem, Organization, Team};
use std::collections::BTreeSet;
use std::sync::Arc;
use storage::BlobStore;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const ORG_CACHE_KEY: &str = "organizations-cache-v1";

enum DirectoryEvent {
    Teams {
        org: Organization,
        teams: Vec<Team>
    },
    Skipped {
        name: String
    }
}

pub struct OrgDirectory {
    client: Arc<ApiClient>,
    store: Arc<dyn BlobStore>,
    pool: FetchPool,
    state: watch::Sender<FeedState<OrgTeamItem>>,
    current_pass: Mutex<Option<CancellationToken>>
}

impl OrgDirectory {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn BlobStore>, pool_size: usize) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            client,
            store,
            pool: FetchPool::new(pool_size),
            state,
            current_pass: Mutex::new(None)
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<OrgTeamItem>> {
        self.state.subscribe()
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> AggregateResult<()> {
        let cancel = self.begin_pass().await;
        self.run_hard(&cancel).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> AggregateResult<()> {
        let cancel = self.begin_pass().await;

        let Some(cached) = self.read_cache().await else {
            return self.run_hard(&cancel).await;
        };
        if cancel.is_cancelled() {
            return Ok(());
        }

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

    pub async fn shutdown(&self) {
        if let Some(cancel) = self.current_pass.lock().await.take() {
            cancel.cancel();
        }
    }

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

    async fn run_pass(&self, cancel: &CancellationToken, background: bool) -> AggregateResult<()> {
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
            self.write_cache(&CachedOrgDirectory {
                items: Vec::new(),
                skipped_orgs: Vec::new()
            })
            .await;
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        for org in orgs {
            let client = Arc::clone(&self.client);
            let pool = self.pool.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let teams = pool.run(client.teams(&org.zone, org.id, &cancel)).await;
                if cancel.is_cancelled() {
                    return;
                }
                match teams {
                    Ok(teams) => {
                        let _ = tx.send(DirectoryEvent::Teams { org, teams });
                    }
                    Err(err) => {
                        warn!(org = %org.name, error = %err, "Skipping organization: team fetch failed");
                        let _ = tx.send(DirectoryEvent::Skipped { name: org.name });
                    }
                }
            });
        }
        drop(tx);

        let mut items: Vec<OrgTeamItem> = Vec::new();
        let mut skipped: BTreeSet<String> = BTreeSet::new();

        while let Some(event) = rx.recv().await {
            if cancel.is_cancelled() {
                return Ok(());
            }
            match event {
                DirectoryEvent::Teams { org, teams } => {
                    items.extend(teams.into_iter().map(|team| OrgTeamItem {
                        org: org.clone(),
                        team
                    }));
                    if !background {
                        self.state.send_replace(FeedState {
                            items: sorted_by_org_name(items.clone()),
                            is_loading: true,
                            skipped_orgs: skipped.iter().cloned().collect()
                        });
                    }
                }
                DirectoryEvent::Skipped { name } => {
                    skipped.insert(name);
                }
            }
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        let final_items = sorted_by_org_name(items);
        let skipped_orgs: Vec<String> = skipped.into_iter().collect();
        self.state.send_replace(FeedState {
            items: final_items.clone(),
            is_loading: false,
            skipped_orgs: skipped_orgs.clone()
        });
        self.write_cache(&CachedOrgDirectory {
            items: final_items,
            skipped_orgs
        })
        .await;
        Ok(())
    }

    async fn read_cache(&self) -> Option<CachedOrgDirectory> {
        match self.store.get(ORG_CACHE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "Cache read failed");
                None
            }
        }
    }

    async fn write_cache(&self, snapshot: &CachedOrgDirectory) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "Cache serialization failed");
                return;
            }
        };
        if let Err(err) = self.store.set(ORG_CACHE_KEY, &raw).await {
            warn!(error = %err, "Cache write failed");
        }
    }
}

/// Stable sort on organization name: teams keep their API order within
/// one organization.
fn sorted_by_org_name(mut items: Vec<OrgTeamItem>) -> Vec<OrgTeamItem> {
    items.sort_by(|a, b| a.org.name.cmp(&b.org.name));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(org_name: &str, team_id: i64) -> OrgTeamItem {
        OrgTeamItem {
            org: Organization {
                id: 1,
                name: org_name.into(),
                zone: "eu1.make.com".into()
            },
            team: Team {
                id: team_id,
                name: format!("Team {team_id}"),
                organization_id: 1
            }
        }
    }

    #[test]
    fn sorting_is_stable_within_an_organization() {
        let sorted = sorted_by_org_name(vec![
            pair("Zeta", 1),
            pair("Acme", 5),
            pair("Acme", 2),
            pair("Mint", 9),
        ]);
        let view: Vec<(String, i64)> = sorted
            .into_iter()
            .map(|item| (item.org.name, item.team.id))
            .collect();
        assert_eq!(
            view,
            vec![
                ("Acme".to_string(), 5),
                ("Acme".to_string(), 2),
                ("Mint".to_string(), 9),
                ("Zeta".to_string(), 1)
            ]
        );
    }
}
