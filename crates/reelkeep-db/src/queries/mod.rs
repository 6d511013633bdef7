//! Database query modules.

pub mod history;
pub mod items;
pub mod libraries;
pub mod provider_cache;
