//! Recurring poll cycle across all registered groups.
//!
//! Each cycle snapshots the registry and runs fetch → filter → persist →
//! dispatch per group. Failures are isolated per group: one group's broken
//! fetch or delivery never aborts the others, and nothing escapes
//! [`run_cycle`].

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::MissedTickBehavior;

use crate::error::{AppError, Result};
use crate::models::{GroupConfig, PollConfig};
use crate::pipeline::{compose, filter_new};
use crate::services::{MessageDispatcher, SightingProvider};
use crate::storage::RegistryHandle;

/// Summary of one poll cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Groups present in the registry snapshot
    pub groups: usize,
    /// Groups that received a digest
    pub notified: usize,
    /// Groups whose provider fetch failed
    pub fetch_failures: usize,
    /// Groups whose digest delivery failed
    pub dispatch_failures: usize,
}

/// Run one poll cycle over every registered group.
///
/// Groups are polled concurrently, bounded by `max_concurrent`; the four
/// steps for any single group run sequentially. Never returns an error.
pub async fn run_cycle(
    registry: &RegistryHandle,
    provider: &dyn SightingProvider,
    dispatcher: &dyn MessageDispatcher,
    max_concurrent: usize,
) -> CycleStats {
    let groups = registry.snapshot().await;
    let mut stats = CycleStats {
        groups: groups.len(),
        ..CycleStats::default()
    };

    if groups.is_empty() {
        log::debug!("No groups registered, skipping cycle");
        return stats;
    }

    let mut results = stream::iter(groups)
        .map(|(group_id, group)| async move {
            let result = poll_group(registry, provider, dispatcher, &group_id, &group).await;
            (group_id, group.name, result)
        })
        .buffer_unordered(max_concurrent.max(1));

    while let Some((group_id, group_name, result)) = results.next().await {
        match result {
            Ok(true) => stats.notified += 1,
            Ok(false) => {}
            Err(e @ AppError::Provider { .. }) => {
                stats.fetch_failures += 1;
                log::warn!("Fetch failed for group '{group_name}': {e}");
            }
            Err(e @ AppError::Dispatch { .. }) => {
                stats.dispatch_failures += 1;
                log::warn!("Dispatch failed for group '{group_name}': {e}");
            }
            Err(e) => {
                stats.fetch_failures += 1;
                log::warn!("Poll failed for group '{group_id}': {e}");
            }
        }
    }

    log::info!(
        "Cycle complete: {} groups, {} notified, {} fetch failures, {} dispatch failures",
        stats.groups,
        stats.notified,
        stats.fetch_failures,
        stats.dispatch_failures
    );
    stats
}

/// Poll a single group. Returns whether a digest was dispatched.
async fn poll_group(
    registry: &RegistryHandle,
    provider: &dyn SightingProvider,
    dispatcher: &dyn MessageDispatcher,
    group_id: &str,
    group: &GroupConfig,
) -> Result<bool> {
    let fetched = provider
        .fetch_notable(group.lat, group.lng, group.distance_km)
        .await
        .map_err(|e| AppError::provider(group_id, e))?;

    let outcome = filter_new(&group.seen_sightings, &fetched);
    if !outcome.has_new() {
        log::debug!("Nothing new for group '{}'", group.name);
        return Ok(false);
    }

    log::info!(
        "{} new sightings for group '{}' near {}",
        outcome.new_sightings.len(),
        group.name,
        group.location
    );

    // Persist before dispatch: delivery is at most once. A failed write is
    // the one condition that risks duplicate announcements next cycle.
    if let Err(e) = registry.record_seen(group_id, outcome.updated_seen).await {
        log::error!(
            "Seen-history persist failed for group '{}': {e}; duplicates possible next cycle",
            group.name
        );
    }

    let Some(message) = compose(&group.location, &outcome.new_sightings) else {
        return Ok(false);
    };

    dispatcher
        .send(group_id, &message)
        .await
        .map_err(|e| AppError::dispatch(group_id, e))?;

    Ok(true)
}

/// Drive [`run_cycle`] on the configured cadence, forever.
///
/// The first cycle runs immediately. Each cycle is awaited before the next
/// tick is taken, so cycles never overlap and no group can race its own
/// seen-history write.
pub async fn run_scheduler(
    registry: &RegistryHandle,
    provider: &dyn SightingProvider,
    dispatcher: &dyn MessageDispatcher,
    config: &PollConfig,
) {
    let period = Duration::from_secs(config.interval_minutes * 60);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log::info!(
        "Polling every {} minutes ({} groups registered)",
        config.interval_minutes,
        registry.len().await
    );

    loop {
        interval.tick().await;
        log::info!("Checking for notable bird sightings...");
        run_cycle(registry, provider, dispatcher, config.max_concurrent).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Registry, Sighting};
    use crate::storage::{LocalStore, SettingsStore};

    fn make_sighting(species: &str) -> Sighting {
        Sighting {
            species_code: species.to_string(),
            com_name: format!("{species} (common name)"),
            loc_name: "Test Marsh".to_string(),
            obs_dt: "2024-05-12 07:45".to_string(),
            how_many: None,
            lat: None,
            lng: None,
        }
    }

    fn make_group(name: &str, lat: f64) -> GroupConfig {
        GroupConfig::new(name, "Testville", lat, -115.0, 25.0)
    }

    /// Provider returning fixed sightings, failing for selected latitudes.
    struct StubProvider {
        sightings: Vec<Sighting>,
        fail_lats: Vec<f64>,
    }

    #[async_trait]
    impl SightingProvider for StubProvider {
        async fn fetch_notable(
            &self,
            lat: f64,
            _lng: f64,
            _distance_km: f64,
        ) -> crate::error::Result<Vec<Sighting>> {
            if self.fail_lats.iter().any(|l| (l - lat).abs() < f64::EPSILON) {
                return Err(AppError::provider("stub", "provider unreachable"));
            }
            Ok(self.sightings.clone())
        }
    }

    /// Dispatcher recording every delivery, optionally failing them all.
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageDispatcher for RecordingDispatcher {
        async fn send(&self, group_id: &str, message: &str) -> crate::error::Result<()> {
            if self.fail {
                return Err(AppError::dispatch(group_id, "transport down"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((group_id.to_string(), message.to_string()));
            Ok(())
        }
    }

    /// Store whose saves always fail.
    struct FailingStore;

    #[async_trait]
    impl SettingsStore for FailingStore {
        async fn load(&self) -> crate::error::Result<Registry> {
            Ok(Registry::new())
        }

        async fn save(&self, _registry: &Registry) -> crate::error::Result<()> {
            Err(AppError::persistence("disk full"))
        }
    }

    async fn handle_with(tmp: &TempDir, registry: Registry) -> RegistryHandle {
        let store = Arc::new(LocalStore::new(tmp.path().join("storage.json")));
        store.save(&registry).await.unwrap();
        RegistryHandle::open(store).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_registry_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let handle = handle_with(&tmp, Registry::new()).await;
        let provider = StubProvider {
            sightings: vec![make_sighting("amecro")],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher::default();

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats, CycleStats::default());
        assert!(dispatcher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_sightings_are_dispatched_and_persisted() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new();
        registry.insert("g1".to_string(), make_group("Birders", 36.0));
        let handle = handle_with(&tmp, registry).await;

        let provider = StubProvider {
            sightings: vec![make_sighting("amecro"), make_sighting("bkpwar")],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher::default();

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats.notified, 1);
        let sent = dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "g1");
        assert!(sent[0].1.contains("amecro (common name)"));

        let group = handle.get("g1").await.unwrap();
        assert_eq!(group.seen_sightings.len(), 2);
    }

    #[tokio::test]
    async fn test_second_cycle_sends_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new();
        registry.insert("g1".to_string(), make_group("Birders", 36.0));
        let handle = handle_with(&tmp, registry).await;

        let provider = StubProvider {
            sightings: vec![make_sighting("amecro")],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher::default();

        run_cycle(&handle, &provider, &dispatcher, 4).await;
        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats.notified, 0);
        assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failing_group_does_not_block_others() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new();
        registry.insert("a".to_string(), make_group("Group A", 1.0));
        registry.insert("b".to_string(), make_group("Group B", 2.0));
        let handle = handle_with(&tmp, registry).await;

        let provider = StubProvider {
            sightings: vec![make_sighting("amecro")],
            fail_lats: vec![1.0],
        };
        let dispatcher = RecordingDispatcher::default();

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats.groups, 2);
        assert_eq!(stats.fetch_failures, 1);
        assert_eq!(stats.notified, 1);

        let sent = dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "b");

        // Failed group's history untouched
        assert!(handle.get("a").await.unwrap().seen_sightings.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_still_marks_seen() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new();
        registry.insert("g1".to_string(), make_group("Birders", 36.0));
        let handle = handle_with(&tmp, registry).await;

        let provider = StubProvider {
            sightings: vec![make_sighting("amecro")],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher {
            fail: true,
            ..RecordingDispatcher::default()
        };

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats.dispatch_failures, 1);
        assert_eq!(stats.notified, 0);
        // At-most-once: sighting stays recorded, not re-sent next cycle
        assert_eq!(handle.get("g1").await.unwrap().seen_sightings.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_persist_is_nonfatal_and_keeps_memory() {
        let mut registry = Registry::new();
        registry.insert("g1".to_string(), make_group("Birders", 36.0));
        let handle = RegistryHandle::with_registry(Arc::new(FailingStore), registry);

        let provider = StubProvider {
            sightings: vec![make_sighting("amecro")],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher::default();

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        // The cycle survives the failed write and the digest still goes out
        assert_eq!(stats.notified, 1);
        assert_eq!(stats.fetch_failures, 0);
        assert_eq!(stats.dispatch_failures, 0);
        assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);

        // In-memory history kept despite the failed persist
        assert_eq!(handle.get("g1").await.unwrap().seen_sightings.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_fetch_skips_persist() {
        let tmp = TempDir::new().unwrap();
        let mut registry = Registry::new();
        let mut group = make_group("Birders", 36.0);
        group.seen_sightings = vec!["old-2024-01-01 10:00".to_string()];
        registry.insert("g1".to_string(), group);
        let handle = handle_with(&tmp, registry).await;

        let provider = StubProvider {
            sightings: vec![],
            fail_lats: vec![],
        };
        let dispatcher = RecordingDispatcher::default();

        let stats = run_cycle(&handle, &provider, &dispatcher, 4).await;

        assert_eq!(stats.notified, 0);
        assert_eq!(
            handle.get("g1").await.unwrap().seen_sightings,
            vec!["old-2024-01-01 10:00".to_string()]
        );
    }
}
