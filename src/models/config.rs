//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Poll cadence and group defaults
    #[serde(default)]
    pub poll: PollConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Sighting provider endpoint
    #[serde(default)]
    pub ebird: EbirdConfig,

    /// Geocoding endpoint and bias
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Path of the registry storage file
    #[serde(default = "defaults::storage_path")]
    pub storage_path: String,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_minutes == 0 {
            return Err(AppError::validation("poll.interval_minutes must be > 0"));
        }
        if !self.poll.default_distance_km.is_finite() || self.poll.default_distance_km <= 0.0 {
            return Err(AppError::validation(
                "poll.default_distance_km must be a positive number",
            ));
        }
        if self.poll.max_concurrent == 0 {
            return Err(AppError::validation("poll.max_concurrent must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.ebird.endpoint.trim().is_empty() {
            return Err(AppError::validation("ebird.endpoint is empty"));
        }
        if self.geocode.endpoint.trim().is_empty() {
            return Err(AppError::validation("geocode.endpoint is empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            http: HttpConfig::default(),
            ebird: EbirdConfig::default(),
            geocode: GeocodeConfig::default(),
            storage_path: defaults::storage_path(),
        }
    }
}

/// Poll cadence and per-group defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Minutes between poll cycles
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,

    /// Search radius in kilometers applied to newly configured groups
    #[serde(default = "defaults::default_distance")]
    pub default_distance_km: f64,

    /// Maximum groups polled concurrently within one cycle
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::interval_minutes(),
            default_distance_km: defaults::default_distance(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests. Nominatim's usage policy
    /// requires a distinguishing client identifier.
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Sighting provider settings. The API key is supplied via the
/// `EBIRD_API_KEY` environment variable, not the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbirdConfig {
    /// Base URL of the notable-observations endpoint
    #[serde(default = "defaults::ebird_endpoint")]
    pub endpoint: String,
}

impl Default for EbirdConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ebird_endpoint(),
        }
    }
}

/// Geocoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Base URL of the search endpoint
    #[serde(default = "defaults::geocode_endpoint")]
    pub endpoint: String,

    /// Country suffix appended to queries to avoid cross-border matches
    #[serde(default = "defaults::country_bias")]
    pub country_bias: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::geocode_endpoint(),
            country_bias: defaults::country_bias(),
        }
    }
}

mod defaults {
    // Poll defaults
    pub fn interval_minutes() -> u64 {
        30
    }
    pub fn default_distance() -> f64 {
        25.0
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "bird-alert-bot/1.0 (contact@example.com)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Endpoint defaults
    pub fn ebird_endpoint() -> String {
        "https://api.ebird.org/v2/data/obs/geo/recent/notable".into()
    }
    pub fn geocode_endpoint() -> String {
        "https://nominatim.openstreetmap.org/search".into()
    }
    pub fn country_bias() -> String {
        "USA".into()
    }

    // Storage defaults
    pub fn storage_path() -> String {
        "storage.json".into()
    }
}
