//! Pipeline stages for the poll cycle.
//!
//! - `dedup`: filter fetched sightings against a group's seen history
//! - `digest`: compose the bounded notification message
//! - `poll`: drive fetch → filter → persist → dispatch across all groups

pub mod dedup;
pub mod digest;
pub mod poll;

pub use dedup::{FilterOutcome, SEEN_HISTORY_LIMIT, filter_new};
pub use digest::{DIGEST_LIMIT, compose};
pub use poll::{CycleStats, run_cycle, run_scheduler};
