// src/commands.rs

//! Interactive group commands.
//!
//! The chat transport forwards incoming messages here. Two commands are
//! recognized, in group conversations only:
//!
//! - `/setlocation <place>` — geocode the place and register the group
//! - `/groupstatus` — show the group's stored configuration
//!
//! Anything else (and anything outside a group chat) produces no reply.

use std::sync::Arc;

use crate::error::Result;
use crate::models::GroupConfig;
use crate::services::Geocoder;
use crate::storage::RegistryHandle;

const SET_LOCATION: &str = "/setlocation";
const GROUP_STATUS: &str = "/groupstatus";

/// An inbound chat message as seen by the command layer.
#[derive(Debug, Clone)]
pub struct Incoming {
    /// Stable opaque id of the conversation
    pub chat_id: String,
    /// Display name of the conversation
    pub chat_name: String,
    /// Whether the conversation is a group chat
    pub is_group: bool,
    /// Raw message text
    pub text: String,
}

/// A parsed group command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    SetLocation(String),
    Status,
}

fn parse(text: &str) -> Option<Command> {
    let text = text.trim();

    if text.eq_ignore_ascii_case(GROUP_STATUS) {
        return Some(Command::Status);
    }
    match text.split_at_checked(SET_LOCATION.len()) {
        Some((head, rest)) if head.eq_ignore_ascii_case(SET_LOCATION) => {
            Some(Command::SetLocation(rest.trim().to_string()))
        }
        _ => None,
    }
}

/// Handles group commands against the shared registry.
pub struct CommandHandler {
    registry: Arc<RegistryHandle>,
    geocoder: Arc<dyn Geocoder>,
    default_distance_km: f64,
}

impl CommandHandler {
    /// Create a handler bound to the registry and geocoding backend.
    pub fn new(
        registry: Arc<RegistryHandle>,
        geocoder: Arc<dyn Geocoder>,
        default_distance_km: f64,
    ) -> Self {
        Self {
            registry,
            geocoder,
            default_distance_km,
        }
    }

    /// Handle one inbound message. `Ok(Some(reply))` is sent back to the
    /// conversation; `Ok(None)` means the message was not a group command.
    pub async fn handle(&self, msg: &Incoming) -> Result<Option<String>> {
        if !msg.is_group {
            return Ok(None);
        }

        match parse(&msg.text) {
            Some(Command::SetLocation(place)) => self
                .set_location(&msg.chat_id, &msg.chat_name, &place)
                .await
                .map(Some),
            Some(Command::Status) => Ok(Some(self.status(&msg.chat_id).await)),
            None => Ok(None),
        }
    }

    /// Resolve a place and register or update the group's location.
    ///
    /// On geocoding misses the registry is left untouched and the reply
    /// tells the user; only geocoding backend failures propagate as errors.
    pub async fn set_location(
        &self,
        group_id: &str,
        group_name: &str,
        place: &str,
    ) -> Result<String> {
        if place.is_empty() {
            return Ok(format!(
                "Usage: {SET_LOCATION} <place name>, e.g. {SET_LOCATION} Las Vegas"
            ));
        }

        let Some(coords) = self.geocoder.resolve(place).await? else {
            log::info!("Geocoding found nothing for '{place}' (group '{group_name}')");
            return Ok(format!("Couldn't find location \"{place}\". Try again."));
        };

        let group = self
            .registry
            .upsert_location(
                group_id,
                group_name,
                place,
                coords.lat,
                coords.lng,
                self.default_distance_km,
            )
            .await?;

        log::info!(
            "Group '{group_name}' now watching {} ({}, {}) within {}km",
            group.location,
            group.lat,
            group.lng,
            group.distance_km
        );
        Ok(format!(
            "Location set to {} (within {}km).",
            group.location, group.distance_km
        ))
    }

    /// Describe the group's stored configuration. Pure read.
    pub async fn status(&self, group_id: &str) -> String {
        status_reply(self.registry.get(group_id).await.as_ref())
    }
}

/// Describe a group's stored configuration, or hint at setup when absent.
///
/// Needs no geocoder or HTTP client; callers with only a registry (like the
/// CLI status command) use this directly.
pub fn status_reply(group: Option<&GroupConfig>) -> String {
    match group {
        Some(group) => format!(
            "Group: {}\nLocation: {}\nLat/Lng: {}, {}\nRadius: {}km",
            group.name, group.location, group.lat, group.lng, group.distance_km
        ),
        None => format!(
            "This group hasn't set a location yet. Use `{SET_LOCATION} Las Vegas` to get started."
        ),
    }
}
