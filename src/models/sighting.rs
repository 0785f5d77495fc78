//! Notable sighting data as returned by the eBird API.

use serde::{Deserialize, Serialize};

/// A single notable observation from the provider.
///
/// Field names map eBird's camelCase JSON. The observation timestamp is a
/// provider-defined string and is carried verbatim, never reparsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sighting {
    /// eBird species code (e.g. "amecro")
    #[serde(rename = "speciesCode")]
    pub species_code: String,

    /// Common species name
    #[serde(rename = "comName")]
    pub com_name: String,

    /// Name of the observation location
    #[serde(rename = "locName")]
    pub loc_name: String,

    /// Observation date/time as reported by the provider
    #[serde(rename = "obsDt")]
    pub obs_dt: String,

    /// Reported individual count, absent when not counted
    #[serde(rename = "howMany", default, skip_serializing_if = "Option::is_none")]
    pub how_many: Option<u32>,

    /// Observation latitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Observation longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Sighting {
    /// Deduplication key: species code and observation timestamp.
    ///
    /// Two sightings with the same species and timestamp are the same event
    /// even if the location name differs.
    pub fn dedup_id(&self) -> String {
        format!("{}-{}", self.species_code, self.obs_dt)
    }
}
