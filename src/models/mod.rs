// src/models/mod.rs

//! Domain models for the alert service.

mod config;
mod group;
mod sighting;

// Re-export all public types
pub use config::{Config, EbirdConfig, GeocodeConfig, HttpConfig, PollConfig};
pub use group::{GroupConfig, Registry};
pub use sighting::Sighting;
