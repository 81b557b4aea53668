use crate::error::{ApiError, ApiResult};
use config::Config;
use ms_core::Zone;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fixed page size for every paginated collection query.
pub const PAGE_LIMIT: usize = 100;

/// Hard cap on pages per logical query, bounding a collection at 5,000
/// items even if the server never returns a short page.
pub const MAX_PAGES: usize = 50;

/// Tagged result of parsing one page response: either a valid page of
/// items, or end-of-data (collection key missing or not a sequence).
#[derive(Debug)]
pub enum PageOutcome<T> {
    Items(Vec<T>),
    End
}

pub struct ApiClient {
    http: Client,
    auth_header: String,
    scheme: String,
    discovery_zone: Zone
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            http,
            auth_header: config.auth_header(),
            scheme: config.scheme.clone(),
            discovery_zone: config.discovery_zone.clone()
        })
    }

    /// Zone the account-level discovery endpoints are served from.
    pub fn discovery_zone(&self) -> &Zone {
        &self.discovery_zone
    }

    fn base_url(&self, zone: &Zone) -> String {
        format!("{}://{}/api/v2", self.scheme, zone)
    }

    /// Issues one authenticated request and classifies the response:
    /// 401/403 become a distinguished authentication failure, any other
    /// non-2xx a generic API error carrying status and endpoint.
    pub(crate) async fn get_value(
        &self,
        zone: &Zone,
        path: &str,
        params: &[(&str, String)]
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url(zone), path);
        debug!(url = %url, "Making API request");

        let mut request = self
            .http
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json");
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Authentication { zone: zone.clone() });
        }
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown")
                    .to_string(),
                zone: zone.clone(),
                path: path.to_string()
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Fetches the full logical collection behind `key` by requesting
    /// fixed-size pages at increasing offsets until a short page, a
    /// malformed page, or the page cap ends the loop.
    ///
    /// A cancellation signaled mid-flight ends the loop without error;
    /// callers discard the partial accumulation through their own
    /// cancellation check.
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        zone: &Zone,
        path: &str,
        params: &[(&str, String)],
        key: &str,
        cancel: &CancellationToken
    ) -> ApiResult<Vec<T>> {
        let mut all_items = Vec::new();

        for page in 0..MAX_PAGES {
            if cancel.is_cancelled() {
                break;
            }

            let offset = page * PAGE_LIMIT;
            let mut page_params: Vec<(&str, String)> = params.to_vec();
            page_params.push(("pg[offset]", offset.to_string()));
            page_params.push(("pg[limit]", PAGE_LIMIT.to_string()));

            let body = tokio::select! {
                () = cancel.cancelled() => break,
                result = self.get_value(zone, path, &page_params) => result?,
            };

            match page_outcome::<T>(body, key)? {
                PageOutcome::Items(items) => {
                    let short_page = items.len() < PAGE_LIMIT;
                    all_items.extend(items);
                    if short_page {
                        break;
                    }
                }
                PageOutcome::End => break
            }
        }

        Ok(all_items)
    }
}

/// Parses one page body into a tagged outcome. A missing collection key,
/// or a key holding anything but a sequence, is natural end-of-data.
fn page_outcome<T: DeserializeOwned>(mut body: Value, key: &str) -> ApiResult<PageOutcome<T>> {
    match body.get_mut(key) {
        Some(value @ Value::Array(_)) => {
            let items: Vec<T> = serde_json::from_value(value.take())?;
            Ok(PageOutcome::Items(items))
        }
        _ => Ok(PageOutcome::End)
    }
}
