//! Storage abstractions for the group registry.
//!
//! The registry is the sole unit of persisted state. This process is its
//! only writer; every in-memory mutation is persisted before the mutation
//! is considered complete (see [`RegistryHandle`]).

pub mod local;
pub mod registry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Registry;

// Re-export for convenience
pub use local::LocalStore;
pub use registry::RegistryHandle;

/// On-disk document wrapping the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageData {
    /// ISO 8601 timestamp of last write
    pub updated_at: DateTime<Utc>,
    /// All configured groups
    pub groups: Registry,
}

impl StorageData {
    pub fn new(groups: Registry) -> Self {
        Self {
            updated_at: Utc::now(),
            groups,
        }
    }
}

/// Trait for registry storage backends.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the registry, returning an empty one when no prior state exists.
    async fn load(&self) -> Result<Registry>;

    /// Durably write the full registry.
    async fn save(&self, registry: &Registry) -> Result<()>;
}
