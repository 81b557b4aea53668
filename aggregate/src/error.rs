use client::ApiError;
use thiserror::Error;

pub type AggregateResult<T> = Result<T, AggregateError>;

/// Pass-fatal failures surfaced to the feed caller. Branch-level
/// failures never reach this type; they become skipped-organization
/// entries instead.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Api(#[from] ApiError)
}
