//! File-backed blob store: one JSON file per key under a root directory.

use crate::{BlobStore, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FileStore {
    root: PathBuf
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into())
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        debug!(path = %path.display(), "writing cache blob");
        tokio::fs::write(path, value).await?;
        Ok(())
    }
}
