use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scraper::Credentials;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// ScreenScraper API credentials.
    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// API base, without the trailing `/<command>.php` part.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root directory for cached raw responses.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_dir: default_cache_dir(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.screenscraper.fr/api".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvertConfig {
    /// Rom extensions written to generated emulator configs, `;`-separated.
    #[serde(default = "default_rom_extensions")]
    pub rom_extensions: String,

    /// Optional RocketLauncher executable; when set, generated emulators
    /// launch through it instead of the platform's own emulator.
    #[serde(default)]
    pub rocketlauncher: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            rom_extensions: default_rom_extensions(),
            rocketlauncher: None,
        }
    }
}

fn default_rom_extensions() -> String {
    ".smc;.zip;.7z;.nes;.gba;.gb;.rom;.a26;.lnx;.gg;.int;.sms;.nds;.pce;.cue;.pbp;.iso;.cso;.32x;.bin;.rar;.dsk;.mx2;.lha;.n64;.wud;.wux;.rpx;.cdi;.adf;.d64;.t64"
        .to_string()
}
