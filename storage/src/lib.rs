//! # Makescope Storage
//!
//! The snapshot cache layer: an opaque key to JSON-blob store with
//! best-effort semantics. Callers treat every failure as "no cache" —
//! reads and writes are never load-bearing for correctness.

pub mod file_store;
pub mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache io failed: {0}")]
    Io(#[from] std::io::Error)
}

/// Key to blob store with get/set-by-key semantics and no transactional
/// guarantees. Last writer wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the blob stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any prior blob.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}
