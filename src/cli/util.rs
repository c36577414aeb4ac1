//! CLI Common Utilities
//!
//! Settings resolution shared by every command.

use std::path::{Path, PathBuf};

use crate::ai::Orchestrator;
use crate::config::{ConfigSnapshot, RoutingLoader, Settings, SettingsLoader};
use crate::types::Result;

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub settings: Settings,
}

impl CommandContext {
    /// Layered settings, with `routing_override` taking precedence over
    /// every settings source
    pub fn load(routing_override: Option<PathBuf>) -> Result<Self> {
        let mut settings = SettingsLoader::load()?;
        if let Some(path) = routing_override {
            settings.routing_path = path;
        }
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn routing_path(&self) -> &Path {
        &self.settings.routing_path
    }

    /// Validated snapshot of the routing document
    pub fn snapshot(&self) -> Result<ConfigSnapshot> {
        RoutingLoader::load(self.routing_path())
    }

    pub fn orchestrator(&self) -> Result<Orchestrator> {
        Orchestrator::from_settings(&self.settings)
    }
}
