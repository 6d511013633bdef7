mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

use crate::scanner::ScanConfig;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./reelkeep.toml",
        "~/.config/reelkeep/config.toml",
        "/etc/reelkeep/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.matching.review_threshold) {
        anyhow::bail!(
            "matching.review_threshold must be in [0, 1], got {}",
            config.matching.review_threshold
        );
    }

    if config.matching.max_workers == 0 {
        anyhow::bail!("matching.max_workers cannot be 0");
    }

    if config.cache.ttl_secs <= 0 {
        anyhow::bail!("cache.ttl_secs must be positive, got {}", config.cache.ttl_secs);
    }

    // Missing roots are reported at scan time, not here
    for root in &config.scan.roots {
        if !root.exists() {
            tracing::warn!("Scan root does not exist: {:?}", root);
        }
    }

    Ok(())
}

impl Config {
    /// Scan parameters derived from the `[scan]` section.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            root_paths: self.scan.roots.clone(),
            extensions: self.scan.extensions.clone(),
            name_contains: self.scan.name_contains.clone(),
            follow_links: self.scan.follow_links,
        }
    }
}
