//! # Makescope Configuration
//!
//! Runtime configuration for the fetch client and aggregation pipeline:
//! the stored API token, the account-level discovery zone, the fetch pool
//! ceiling and the cache directory. Values come from defaults overridden
//! by `MAKESCOPE_*` environment variables.

use ms_core::Zone;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Account-level zone used for the discovery endpoints (`/users/me`,
/// `/organizations`). Per-organization data lives behind each
/// organization's own zone.
pub const DEFAULT_DISCOVERY_ZONE: &str = "eu1.make.com";

/// Default ceiling for simultaneously in-flight fetches.
pub const DEFAULT_POOL_SIZE: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Config {
    /// Stored API token. Accepted either bare or already prefixed with
    /// `Token `; see [`Config::auth_header`].
    #[validate(length(min = 1, message = "API token must not be empty"))]
    pub api_token: String,

    /// Zone the discovery endpoints are served from.
    pub discovery_zone: Zone,

    /// URL scheme for API requests. Tests point zones at a plain-HTTP
    /// mock server; everything else stays on the default.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Concurrency ceiling of the fetch pool.
    pub pool_size: usize,

    /// Directory the snapshot cache files live in.
    pub cache_dir: PathBuf
}

fn default_scheme() -> String {
    "https".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            discovery_zone: DEFAULT_DISCOVERY_ZONE.to_string(),
            scheme: default_scheme(),
            pool_size: DEFAULT_POOL_SIZE,
            cache_dir: default_cache_dir()
        }
    }
}

impl Config {
    /// Builds configuration from `MAKESCOPE_*` environment variables on
    /// top of the defaults.
    pub fn detect_env() -> Self {
        let mut config = Self::default();

        if let Ok(token) = std::env::var("MAKESCOPE_API_TOKEN") {
            config.api_token = token;
        }
        if let Ok(zone) = std::env::var("MAKESCOPE_ZONE") {
            config.discovery_zone = zone;
        }
        if let Ok(size) = std::env::var("MAKESCOPE_POOL_SIZE")
            && let Ok(size) = size.parse::<usize>()
            && size > 0
        {
            config.pool_size = size;
        }
        if let Ok(dir) = std::env::var("MAKESCOPE_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        config
    }

    /// Assembles the authorization header value from the stored token.
    /// Handles both `Token xxx` and bare `xxx` input.
    pub fn auth_header(&self) -> String {
        let token = self.api_token.trim();
        if token.to_lowercase().starts_with("token ") {
            return token.to_string();
        }
        format!("Token {token}")
    }
}

/// Platform cache directory for Makescope, falling back to a relative
/// directory when the platform reports none.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("makescope"))
        .unwrap_or_else(|| PathBuf::from(".makescope/cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_header_prefixes_bare_token() {
        let config = Config {
            api_token: "abc-123".to_string(),
            ..Config::default()
        };
        assert_eq!(config.auth_header(), "Token abc-123");
    }

    #[test]
    fn auth_header_passes_through_prefixed_token() {
        let config = Config {
            api_token: "Token abc-123".to_string(),
            ..Config::default()
        };
        assert_eq!(config.auth_header(), "Token abc-123");
    }

    #[test]
    fn auth_header_accepts_lowercase_prefix_and_whitespace() {
        let config = Config {
            api_token: "  token abc-123  ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.auth_header(), "token abc-123");
    }

    #[test]
    fn empty_token_fails_validation() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            api_token: "x".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.discovery_zone, DEFAULT_DISCOVERY_ZONE);
        assert_eq!(config.scheme, "https");
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }
}
