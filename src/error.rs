// src/error.rs

//! Unified error handling for the alert service.

use std::fmt;

use thiserror::Error;

/// Result type alias for alert operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Geocoding backend failure (not "place not found", which is Ok(None))
    #[error("Geocoding failed for '{place}': {message}")]
    Geocode { place: String, message: String },

    /// Sighting provider failure for a single group
    #[error("Provider error for {group}: {message}")]
    Provider { group: String, message: String },

    /// Message delivery failure for a single group
    #[error("Dispatch error for {group}: {message}")]
    Dispatch { group: String, message: String },

    /// Durable registry write failed
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a geocoding error with the offending place text.
    pub fn geocode(place: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Geocode {
            place: place.into(),
            message: message.to_string(),
        }
    }

    /// Create a provider error with group context.
    pub fn provider(group: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Provider {
            group: group.into(),
            message: message.to_string(),
        }
    }

    /// Create a dispatch error with group context.
    pub fn dispatch(group: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Dispatch {
            group: group.into(),
            message: message.to_string(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }
}
