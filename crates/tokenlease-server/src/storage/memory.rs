//! In-memory storage backend
//!
//! Default storage implementation. Suitable for development and
//! single-instance deployments. Data is lost on restart.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokenlease_core::BackendConfig;
use tracing::info;

use super::{ConfigStore, StorageError};

/// In-memory config store implementation
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RwLock<Option<Arc<BackendConfig>>>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `config`
    pub fn with_config(config: BackendConfig) -> Self {
        Self {
            config: RwLock::new(Some(Arc::new(config))),
        }
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("config lock poisoned".into())
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn read_config(&self) -> Result<Option<Arc<BackendConfig>>, StorageError> {
        let config = self.config.read().map_err(|_| poisoned())?;
        Ok(config.clone())
    }

    async fn write_config(&self, config: BackendConfig) -> Result<(), StorageError> {
        let mut current = self.config.write().map_err(|_| poisoned())?;
        info!(pachd_address = %config.upstream_address, "Writing backend config");
        *current = Some(Arc::new(config));
        Ok(())
    }

    async fn clear_config(&self) -> Result<bool, StorageError> {
        let mut current = self.config.write().map_err(|_| poisoned())?;
        let removed = current.take().is_some();
        if removed {
            info!("Cleared backend config");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryConfigStore::new();
        assert!(store.read_config().await.unwrap().is_none());
        assert!(!store.clear_config().await.unwrap());
    }

    #[tokio::test]
    async fn test_write_read_clear() {
        let store = MemoryConfigStore::new();
        store
            .write_config(BackendConfig::new("localhost:650", "admin"))
            .await
            .unwrap();

        let config = store.read_config().await.unwrap().unwrap();
        assert_eq!(config.upstream_address, "localhost:650");
        assert_eq!(config.admin_credential.expose(), "admin");

        assert!(store.clear_config().await.unwrap());
        assert!(store.read_config().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_overwrite() {
        let store = MemoryConfigStore::with_config(BackendConfig::new("old:650", "old-admin"));
        let snapshot = store.read_config().await.unwrap().unwrap();

        store
            .write_config(BackendConfig::new("new:650", "new-admin"))
            .await
            .unwrap();

        // A reader keeps a consistent view of the config it started with
        assert_eq!(snapshot.upstream_address, "old:650");
        assert_eq!(snapshot.admin_credential.expose(), "old-admin");

        let current = store.read_config().await.unwrap().unwrap();
        assert_eq!(current.upstream_address, "new:650");
    }
}
