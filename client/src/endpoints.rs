//! Typed endpoint functions over the paginated client.
//!
//! Discovery endpoints (`/users/me`, `/organizations`) run against the
//! account-level zone; everything else runs against the owning
//! organization's zone.

use crate::client::ApiClient;
use crate::error::ApiResult;
use ms_core::{Folder, Hook, Organization, Scenario, ScenarioLog, Team, User, Zone};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(rename = "authUser")]
    auth_user: AuthUser
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: i64
}

impl ApiClient {
    /// Resolves the current user's id from the discovery zone.
    pub async fn current_user_id(&self) -> ApiResult<i64> {
        let zone = self.discovery_zone().clone();
        let body = self.get_value(&zone, "/users/me", &[]).await?;
        let me: MeResponse = serde_json::from_value(body)?;
        Ok(me.auth_user.id)
    }

    pub async fn organizations(
        &self,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<Organization>> {
        let zone = self.discovery_zone().clone();
        self.fetch_all_pages(&zone, "/organizations", &[], "organizations", cancel)
            .await
    }

    pub async fn teams(
        &self,
        zone: &Zone,
        organization_id: i64,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<Team>> {
        self.fetch_all_pages(
            zone,
            "/teams",
            &[("organizationId", organization_id.to_string())],
            "teams",
            cancel
        )
        .await
    }

    pub async fn scenarios(
        &self,
        zone: &Zone,
        team_id: i64,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<Scenario>> {
        self.fetch_all_pages(
            zone,
            "/scenarios",
            &[("teamId", team_id.to_string())],
            "scenarios",
            cancel
        )
        .await
    }

    pub async fn folders(
        &self,
        zone: &Zone,
        team_id: i64,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<Folder>> {
        self.fetch_all_pages(
            zone,
            "/scenarios-folders",
            &[("teamId", team_id.to_string())],
            "scenariosFolders",
            cancel
        )
        .await
    }

    pub async fn hooks(
        &self,
        zone: &Zone,
        team_id: i64,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<Hook>> {
        self.fetch_all_pages(
            zone,
            "/hooks",
            &[("teamId", team_id.to_string())],
            "hooks",
            cancel
        )
        .await
    }

    pub async fn users(
        &self,
        zone: &Zone,
        team_id: i64,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<User>> {
        self.fetch_all_pages(
            zone,
            "/users",
            &[("teamId", team_id.to_string())],
            "users",
            cancel
        )
        .await
    }

    /// Execution/edit history for one scenario. A single request with a
    /// server-side limit; not paginated by this client.
    pub async fn scenario_logs(
        &self,
        zone: &Zone,
        scenario_id: i64
    ) -> ApiResult<Vec<ScenarioLog>> {
        let path = format!("/scenarios/{scenario_id}/logs");
        let body = self
            .get_value(
                zone,
                &path,
                &[
                    ("pg[sortDir]", "desc".to_string()),
                    ("pg[limit]", "50".to_string())
                ]
            )
            .await?;

        match body.get("scenarioLogs") {
            Some(logs @ serde_json::Value::Array(_)) => {
                Ok(serde_json::from_value(logs.clone())?)
            }
            _ => Ok(Vec::new())
        }
    }
}
