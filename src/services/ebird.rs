//! Notable-sighting provider adapter.
//!
//! Queries the eBird API v2 "recent notable observations near a point"
//! endpoint. Authentication is a per-request `X-eBirdApiToken` header.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, Sighting};

const API_TOKEN_HEADER: &str = "X-eBirdApiToken";

/// Trait for notable-sighting sources.
#[async_trait]
pub trait SightingProvider: Send + Sync {
    /// Fetch current notable sightings around a point.
    ///
    /// Returns an empty vec when nothing notable is reported.
    async fn fetch_notable(
        &self,
        lat: f64,
        lng: f64,
        distance_km: f64,
    ) -> Result<Vec<Sighting>>;
}

/// eBird API client.
pub struct EbirdClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl EbirdClient {
    /// Create a client for the configured endpoint.
    pub fn new(client: Client, config: &Config, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: config.ebird.endpoint.clone(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SightingProvider for EbirdClient {
    async fn fetch_notable(
        &self,
        lat: f64,
        lng: f64,
        distance_km: f64,
    ) -> Result<Vec<Sighting>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(API_TOKEN_HEADER, &self.api_key)
            .query(&[
                ("lat", lat.to_string()),
                ("lng", lng.to_string()),
                ("dist", distance_km.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let sightings: Vec<Sighting> = response.json().await?;
        log::debug!(
            "eBird returned {} notable sightings near ({lat}, {lng})",
            sightings.len()
        );
        Ok(sightings)
    }
}
