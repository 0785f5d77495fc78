//! Geocoding adapter.
//!
//! Resolves free-text place names through Nominatim. Queries carry a
//! country suffix to avoid cross-border ambiguity, and the shared HTTP
//! client's User-Agent identifies this tool per Nominatim's usage policy.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Resolved coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Trait for place-name resolution.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name. `Ok(None)` means the place was not found;
    /// `Err` means the backend itself failed.
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>>;
}

/// One search result from Nominatim. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim-backed geocoder.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    country_bias: String,
}

impl NominatimGeocoder {
    /// Create a geocoder for the configured endpoint.
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.geocode.endpoint.clone(),
            country_bias: config.geocode.country_bias.clone(),
        }
    }

    fn parse_first(&self, place: &str, results: Vec<NominatimPlace>) -> Result<Option<Coordinates>> {
        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let lat = first
            .lat
            .parse::<f64>()
            .map_err(|e| AppError::geocode(place, format!("bad latitude '{}': {e}", first.lat)))?;
        let lng = first
            .lon
            .parse::<f64>()
            .map_err(|e| AppError::geocode(place, format!("bad longitude '{}': {e}", first.lon)))?;

        Ok(Some(Coordinates { lat, lng }))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>> {
        let query = format!("{place}, {}", self.country_bias);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::geocode(place, e))?
            .error_for_status()
            .map_err(|e| AppError::geocode(place, e))?;

        let results: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| AppError::geocode(place, e))?;

        self.parse_first(place, results)
    }
}
