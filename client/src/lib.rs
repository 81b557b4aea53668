//! # Makescope API Client
//!
//! Authenticated, paginated fetch client for the Make REST API. One
//! logical collection query becomes a sequence of fixed-size page
//! requests flattened into a single result; non-2xx responses classify
//! into a distinguished authentication failure or a generic API error.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, MAX_PAGES, PAGE_LIMIT, PageOutcome};
pub use error::{ApiError, ApiResult};
