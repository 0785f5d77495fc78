//! Per-group alert configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Registry of all configured groups, keyed by opaque group id.
pub type Registry = BTreeMap<String, GroupConfig>;

/// Alert settings and announcement history for one chat group.
///
/// Serialized field names match the storage document of earlier deployments
/// (`distance`, `seenBirds`) so existing files keep round-tripping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    /// Group display name
    pub name: String,

    /// Human-entered place name the group is watching
    pub location: String,

    /// Resolved latitude
    pub lat: f64,

    /// Resolved longitude
    pub lng: f64,

    /// Search radius in kilometers
    #[serde(rename = "distance")]
    pub distance_km: f64,

    /// Dedup ids already announced, most recent discovery first,
    /// bounded to 100 entries
    #[serde(rename = "seenBirds", default)]
    pub seen_sightings: Vec<String>,
}

impl GroupConfig {
    /// Create a fresh configuration with an empty announcement history.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        lat: f64,
        lng: f64,
        distance_km: f64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            lat,
            lng,
            distance_km,
            seen_sightings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_field_names() {
        let group = GroupConfig::new("Birders", "Las Vegas", 36.17, -115.14, 25.0);
        let json = serde_json::to_value(&group).unwrap();

        assert!(json.get("distance").is_some());
        assert!(json.get("seenBirds").is_some());
        assert!(json.get("distance_km").is_none());
    }

    #[test]
    fn test_missing_seen_birds_defaults_empty() {
        let json = r#"{
            "name": "Birders",
            "location": "Las Vegas",
            "lat": 36.17,
            "lng": -115.14,
            "distance": 25.0
        }"#;

        let group: GroupConfig = serde_json::from_str(json).unwrap();
        assert!(group.seen_sightings.is_empty());
    }
}
