//! Reelkeep - personal media-library discovery and matching
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod matcher;
pub mod metadata;
pub mod scanner;
pub mod workers;
