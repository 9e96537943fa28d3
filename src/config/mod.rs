mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

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
        "./romforge.toml",
        "~/.config/romforge/config.toml",
        "/etc/romforge/config.toml",
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
fn validate_config(config: &Config) -> Result<()> {
    if config.scraper.request_timeout_secs == 0 {
        anyhow::bail!("Scraper request timeout cannot be 0");
    }

    if config.scraper.base_url.is_empty() {
        anyhow::bail!("Scraper base URL cannot be empty");
    }

    // Credentials may legitimately be absent for conversion-only use; the
    // scrape commands check completeness themselves.
    if !config.credentials.is_complete() {
        tracing::warn!("ScreenScraper credentials are incomplete; scrape commands will fail");
    }

    Ok(())
}
