// src/lib.rs

//! birdalert library
//!
//! Polls eBird for notable bird sightings near each registered chat group's
//! location and produces digest notifications for sightings the group has
//! not been told about yet.

pub mod commands;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
