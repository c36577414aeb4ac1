//! Configuration Management
//!
//! Two layers:
//! - [`Settings`]: process settings resolved through defaults, global and
//!   project TOML files, then `VOXROUTE_*` environment variables
//! - the routing document: provider pools, classifier and speech settings,
//!   validated into an immutable [`ConfigSnapshot`] and served by a
//!   hot-reloading [`SnapshotStore`]

mod env;
mod loader;
mod settings;
mod snapshot;
mod store;
mod types;

pub use env::{env_reference_name, resolve_env_reference, resolve_secret};
pub use loader::{DocumentFormat, RoutingLoader};
pub use settings::{Settings, SettingsLoader};
pub use snapshot::{
    ClassifierSettings, ConfigSnapshot, KNOWN_TTS_ENGINES, SelectionSettings, TtsSettings,
};
pub use store::SnapshotStore;
pub use types::*;

#[cfg(test)]
pub(crate) use snapshot::tests::{SAMPLE_JSON, sample_document};
