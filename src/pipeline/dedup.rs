//! Seen-history filtering for notification dispatch.
//!
//! Compares a freshly fetched sighting set against a group's announcement
//! history and yields the sightings never announced before, plus the
//! updated history to persist.

use std::collections::HashSet;

use crate::models::Sighting;

/// Maximum retained announcement ids per group.
///
/// A pure count cap: an id pushed past position 100 becomes eligible to be
/// announced again if the provider still returns it.
pub const SEEN_HISTORY_LIMIT: usize = 100;

/// Result of filtering a fetched sighting set against a seen history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Sightings not announced before, in fetch order
    pub new_sightings: Vec<Sighting>,
    /// History to persist: new ids first, then the prior history,
    /// truncated to [`SEEN_HISTORY_LIMIT`]
    pub updated_seen: Vec<String>,
}

impl FilterOutcome {
    /// Whether anything new was found.
    pub fn has_new(&self) -> bool {
        !self.new_sightings.is_empty()
    }
}

/// Filter fetched sightings against a group's seen history.
///
/// A sighting is new iff its dedup id is absent from `seen`. Ids are ordered
/// by recency of discovery, not recency of the sighting itself: new ids go in
/// front of the prior history, which is then truncated to the cap. A repeat
/// of the same id within one batch is the same event and counts once.
///
/// Empty `fetched` returns the history unchanged; the caller skips the
/// persistence write in that case.
pub fn filter_new(seen: &[String], fetched: &[Sighting]) -> FilterOutcome {
    let seen_set: HashSet<&str> = seen.iter().map(String::as_str).collect();

    let mut new_sightings = Vec::new();
    let mut new_ids = Vec::new();
    let mut batch_ids: HashSet<String> = HashSet::new();

    for sighting in fetched {
        let id = sighting.dedup_id();
        if seen_set.contains(id.as_str()) || !batch_ids.insert(id.clone()) {
            continue;
        }
        new_sightings.push(sighting.clone());
        new_ids.push(id);
    }

    let mut updated_seen = new_ids;
    updated_seen.extend(seen.iter().cloned());
    updated_seen.truncate(SEEN_HISTORY_LIMIT);

    FilterOutcome {
        new_sightings,
        updated_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sighting(species: &str, obs_dt: &str) -> Sighting {
        Sighting {
            species_code: species.to_string(),
            com_name: format!("{species} (common name)"),
            loc_name: "Test Marsh".to_string(),
            obs_dt: obs_dt.to_string(),
            how_many: None,
            lat: None,
            lng: None,
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("sp{i:03}-2024-01-01 10:00")).collect()
    }

    #[test]
    fn test_first_sighting_is_new() {
        let fetched = vec![make_sighting("amecro", "2024-01-01T10:00")];
        let outcome = filter_new(&[], &fetched);

        assert_eq!(outcome.new_sightings.len(), 1);
        assert_eq!(outcome.updated_seen, vec!["amecro-2024-01-01T10:00"]);
    }

    #[test]
    fn test_already_seen_is_filtered() {
        let seen = vec!["amecro-2024-01-01T10:00".to_string()];
        let fetched = vec![
            make_sighting("amecro", "2024-01-01T10:00"),
            make_sighting("bkpwar", "2024-01-02T08:30"),
        ];

        let outcome = filter_new(&seen, &fetched);

        assert_eq!(outcome.new_sightings.len(), 1);
        assert_eq!(outcome.new_sightings[0].species_code, "bkpwar");
        assert_eq!(
            outcome.updated_seen,
            vec![
                "bkpwar-2024-01-02T08:30".to_string(),
                "amecro-2024-01-01T10:00".to_string(),
            ]
        );
    }

    #[test]
    fn test_second_run_finds_nothing() {
        let fetched = vec![
            make_sighting("amecro", "2024-01-01T10:00"),
            make_sighting("bkpwar", "2024-01-02T08:30"),
        ];

        let first = filter_new(&[], &fetched);
        let second = filter_new(&first.updated_seen, &fetched);

        assert!(!second.has_new());
        assert_eq!(second.updated_seen, first.updated_seen);
    }

    #[test]
    fn test_history_capped_at_limit() {
        let seen = ids(SEEN_HISTORY_LIMIT);
        let fetched: Vec<Sighting> = (0..5)
            .map(|i| make_sighting(&format!("new{i}"), "2024-06-01 09:00"))
            .collect();

        let outcome = filter_new(&seen, &fetched);

        assert_eq!(outcome.new_sightings.len(), 5);
        assert_eq!(outcome.updated_seen.len(), SEEN_HISTORY_LIMIT);
        // New ids lead, oldest 5 of the prior history fell off
        assert_eq!(outcome.updated_seen[0], "new0-2024-06-01 09:00");
        assert_eq!(outcome.updated_seen[5], seen[0]);
        assert_eq!(outcome.updated_seen[99], seen[94]);
    }

    #[test]
    fn test_never_exceeds_limit_for_any_input() {
        let seen = ids(SEEN_HISTORY_LIMIT);
        let fetched: Vec<Sighting> = (0..250)
            .map(|i| make_sighting(&format!("flood{i}"), "2024-06-01 09:00"))
            .collect();

        let outcome = filter_new(&seen, &fetched);
        assert_eq!(outcome.updated_seen.len(), SEEN_HISTORY_LIMIT);
    }

    #[test]
    fn test_preserves_fetch_order() {
        let seen = vec!["sp001-2024-01-01 10:00".to_string()];
        let fetched = vec![
            make_sighting("sp002", "2024-01-01 10:00"),
            make_sighting("sp001", "2024-01-01 10:00"),
            make_sighting("sp003", "2024-01-01 10:00"),
            make_sighting("sp004", "2024-01-01 10:00"),
        ];

        let outcome = filter_new(&seen, &fetched);

        let codes: Vec<&str> = outcome
            .new_sightings
            .iter()
            .map(|s| s.species_code.as_str())
            .collect();
        assert_eq!(codes, vec!["sp002", "sp003", "sp004"]);
    }

    #[test]
    fn test_duplicate_within_batch_counts_once() {
        let fetched = vec![
            make_sighting("amecro", "2024-01-01T10:00"),
            make_sighting("amecro", "2024-01-01T10:00"),
        ];

        let outcome = filter_new(&[], &fetched);

        assert_eq!(outcome.new_sightings.len(), 1);
        assert_eq!(outcome.updated_seen.len(), 1);
    }

    #[test]
    fn test_same_species_different_time_is_distinct() {
        let fetched = vec![
            make_sighting("amecro", "2024-01-01T10:00"),
            make_sighting("amecro", "2024-01-01T11:00"),
        ];

        let outcome = filter_new(&[], &fetched);
        assert_eq!(outcome.new_sightings.len(), 2);
    }

    #[test]
    fn test_empty_fetch_leaves_history_unchanged() {
        let seen = ids(7);
        let outcome = filter_new(&seen, &[]);

        assert!(!outcome.has_new());
        assert_eq!(outcome.updated_seen, seen);
    }
}
