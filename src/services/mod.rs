// src/services/mod.rs

//! External collaborator adapters.
//!
//! Each upstream is reached through a trait so the poll cycle and command
//! handlers can be exercised against mocks.

pub mod dispatch;
pub mod ebird;
pub mod geocode;

use std::time::Duration;

use crate::error::Result;
use crate::models::HttpConfig;

pub use dispatch::{ConsoleDispatcher, MessageDispatcher};
pub use ebird::{EbirdClient, SightingProvider};
pub use geocode::{Coordinates, Geocoder, NominatimGeocoder};

/// Create a configured asynchronous HTTP client shared by all adapters.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
