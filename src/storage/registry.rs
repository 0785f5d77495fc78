//! Shared in-memory registry with transactional persistence.
//!
//! Both the poll cycle and the interactive command handlers mutate group
//! state through [`RegistryHandle`]. A single mutex serializes every
//! read-modify-write, and each mutation persists through the backing
//! [`SettingsStore`] before the lock is released, so no observer can see a
//! half-updated group and no completed mutation can be lost to a crash.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{GroupConfig, Registry};
use crate::storage::SettingsStore;

/// Mutex-guarded registry bound to a storage backend.
pub struct RegistryHandle {
    store: Arc<dyn SettingsStore>,
    inner: Mutex<Registry>,
}

impl RegistryHandle {
    /// Load the registry from the store and wrap it.
    pub async fn open(store: Arc<dyn SettingsStore>) -> Result<Self> {
        let registry = store.load().await?;
        Ok(Self {
            store,
            inner: Mutex::new(registry),
        })
    }

    /// Wrap an already-built registry. Used by tests.
    pub fn with_registry(store: Arc<dyn SettingsStore>, registry: Registry) -> Self {
        Self {
            store,
            inner: Mutex::new(registry),
        }
    }

    /// Snapshot of one group's configuration, if registered.
    pub async fn get(&self, group_id: &str) -> Option<GroupConfig> {
        self.inner.lock().await.get(group_id).cloned()
    }

    /// Snapshot of all groups for a poll cycle.
    pub async fn snapshot(&self) -> Registry {
        self.inner.lock().await.clone()
    }

    /// Number of registered groups.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether any groups are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Create or update a group's location.
    ///
    /// An existing group keeps its search radius and announcement history;
    /// a new group starts with the given default radius and empty history.
    /// The change is persisted before this returns.
    pub async fn upsert_location(
        &self,
        group_id: &str,
        name: &str,
        location: &str,
        lat: f64,
        lng: f64,
        default_distance_km: f64,
    ) -> Result<GroupConfig> {
        let mut registry = self.inner.lock().await;

        let group = match registry.get(group_id) {
            Some(existing) => GroupConfig {
                name: name.to_string(),
                location: location.to_string(),
                lat,
                lng,
                distance_km: existing.distance_km,
                seen_sightings: existing.seen_sightings.clone(),
            },
            None => GroupConfig::new(name, location, lat, lng, default_distance_km),
        };

        registry.insert(group_id.to_string(), group.clone());
        self.store.save(&registry).await?;
        Ok(group)
    }

    /// Replace a group's seen history and persist.
    ///
    /// A group deleted between snapshot and write-back is skipped. A failed
    /// persist leaves the in-memory update in place and returns the error;
    /// the caller decides how loudly to surface it.
    pub async fn record_seen(&self, group_id: &str, seen_sightings: Vec<String>) -> Result<()> {
        let mut registry = self.inner.lock().await;

        let Some(group) = registry.get_mut(group_id) else {
            log::warn!("Group {group_id} disappeared before seen-history write, skipping");
            return Ok(());
        };
        group.seen_sightings = seen_sightings;

        self.store.save(&registry).await
    }
}
