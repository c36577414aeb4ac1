//! Application Settings (Figment-based)
//!
//! Process-level settings, separate from the routing document:
//! 1. Built-in defaults (Serialized)
//! 2. Global settings (~/.config/voxroute/settings.toml)
//! 3. Project settings (./voxroute.toml)
//! 4. Environment variables (VOXROUTE_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::network::CONNECTION_TIMEOUT_SECS;
use crate::types::{Result, VoxError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Routing document location
    pub routing_path: PathBuf,

    /// Re-read the routing document once its reload interval elapses
    pub reload_enabled: bool,

    /// HTTP connect timeout for vendor clients (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            routing_path: PathBuf::from("config/ai-config.json"),
            reload_enabled: true,
            connect_timeout_secs: CONNECTION_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 {
            return Err(VoxError::invalid(
                "connect_timeout_secs must be greater than 0",
            ));
        }
        if self.routing_path.as_os_str().is_empty() {
            return Err(VoxError::missing("routing_path"));
        }
        Ok(())
    }
}

/// Settings loader
pub struct SettingsLoader;

impl SettingsLoader {
    /// defaults → global → project → env vars
    pub fn load() -> Result<Settings> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(global_path) = Self::global_settings_path()
            && global_path.exists()
        {
            debug!("Loading global settings from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_settings_path();
        if project_path.exists() {
            debug!("Loading project settings from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // VOXROUTE_ROUTING_PATH -> routing_path
        figment = figment.merge(Env::prefixed("VOXROUTE_").lowercase(true));

        Self::extract(figment)
    }

    /// Defaults overlaid with a single settings file
    pub fn load_from_file(path: &Path) -> Result<Settings> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Settings::default()))
                .merge(Toml::file(path)),
        )
    }

    fn extract(figment: Figment) -> Result<Settings> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| VoxError::invalid(format!("settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// ~/.config/voxroute/
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("voxroute"))
    }

    pub fn global_settings_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("settings.toml"))
    }

    pub fn project_settings_path() -> PathBuf {
        PathBuf::from("voxroute.toml")
    }
}
