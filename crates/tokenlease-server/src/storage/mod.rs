//! Storage abstraction for backend configuration
//!
//! The broker only ever reads configuration; writes come from the operator
//! through the config endpoint. Readers receive an `Arc` snapshot so a
//! concurrent write never hands a caller half of an old config and half of a
//! new one.

pub mod memory;

pub use memory::MemoryConfigStore;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokenlease_core::BackendConfig;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for the single backend configuration
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ConfigStore: Send + Sync + Debug {
    /// Current configuration, or `None` if it was never written
    async fn read_config(&self) -> Result<Option<Arc<BackendConfig>>, StorageError>;

    /// Replace the configuration
    async fn write_config(&self, config: BackendConfig) -> Result<(), StorageError>;

    /// Remove the configuration, returning whether one was present
    async fn clear_config(&self) -> Result<bool, StorageError>;
}
