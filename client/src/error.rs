use ms_core::Zone;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403 from any endpoint. Pass-fatal wherever it occurs.
    #[error("Authentication failed on {zone}. Check your API token.")]
    Authentication { zone: Zone },

    /// Any other non-2xx response.
    #[error("API error {status}: {reason} ({zone}{path})")]
    Api {
        status: u16,
        reason: String,
        zone: Zone,
        path: String
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error)
}

impl ApiError {
    /// Whether the error is an authentication failure, which aborts the
    /// entire pass regardless of which endpoint raised it.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
