use crate::http::HttpOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mod portal account used to authorize artifact downloads.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Global configuration loaded from `~/.config/modsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Portal origin; catalog and download paths are appended to it.
    pub base_url: String,
    /// Catalog listing path, with pagination disabled.
    pub catalog_path: String,
    /// Directory holding `mod-list.json`.
    pub cache_dir: PathBuf,
    /// Directory holding downloaded artifacts.
    pub download_dir: PathBuf,
    /// Pause between consecutive item fetches, in milliseconds.
    pub item_pause_ms: u64,
    pub connect_timeout_secs: u64,
    /// Whole-transfer limit per request.
    pub transfer_timeout_secs: u64,
    /// Optional default credentials; CLI flags take precedence.
    pub username: Option<String>,
    pub token: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mods.factorio.com".to_string(),
            catalog_path: "/api/mods?page_size=max".to_string(),
            cache_dir: PathBuf::from("mod-list"),
            download_dir: PathBuf::from("downloads"),
            item_pause_ms: 1000,
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            username: None,
            token: None,
        }
    }
}

impl SyncConfig {
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.catalog_path)
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.transfer_timeout_secs),
        }
    }

    pub fn item_pause(&self) -> Duration {
        Duration::from_millis(self.item_pause_ms)
    }

    /// Credentials from the config file, with empty strings for missing values.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        )
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("modsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir: {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: SyncConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
