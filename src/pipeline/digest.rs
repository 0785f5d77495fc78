//! Digest message composition.

use crate::models::Sighting;

/// Maximum sightings rendered per digest.
///
/// Everything new is still recorded as seen; only the first few are shown.
pub const DIGEST_LIMIT: usize = 3;

/// Build a digest message for newly found sightings.
///
/// Returns `None` for an empty input, in which case nothing is dispatched.
pub fn compose(location: &str, new_sightings: &[Sighting]) -> Option<String> {
    if new_sightings.is_empty() {
        return None;
    }

    let mut message = format!("New notable birds near {location}\n");
    for sighting in new_sightings.iter().take(DIGEST_LIMIT) {
        message.push_str(&format!(
            "\n- {} at {} on {}",
            sighting.com_name, sighting.loc_name, sighting.obs_dt
        ));
    }
    Some(message)
}
