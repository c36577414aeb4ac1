//! voxroute - AI Response Orchestration for Voice Assistants
//!
//! Takes a spoken question, decides how hard it is, picks one of several
//! configured AI providers by weight, calls it under a strict time budget and
//! hands back a single audio payload.
//!
//! ## Core Features
//!
//! - **Complexity Routing**: keyword and pattern scoring into two provider pools
//! - **Weighted Selection**: reproducible roulette over enabled providers
//! - **Bounded Dispatch**: per-call timeout with cancellation and priority fallback
//! - **Speech Normalization**: text answers spoken through SSML or JSON engines
//! - **Hot Reload**: routing document re-read lazily, published atomically
//!
//! ## Quick Start
//!
//! ```ignore
//! use voxroute::{Orchestrator, SettingsLoader};
//!
//! let settings = SettingsLoader::load()?;
//! let orchestrator = Orchestrator::from_settings(&settings)?;
//! let answer = orchestrator.ask("Pourquoi le ciel est bleu ?").await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: vendor adapters, dispatcher, speech synthesis, orchestrator
//! - [`routing`]: classifier, selector, provider definitions
//! - [`config`]: routing document, snapshot store, application settings

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod routing;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{ConfigSnapshot, RoutingLoader, Settings, SettingsLoader, SnapshotStore};

// Error Types
pub use types::error::{ErrorCategory, Result, VendorError, VoxError};

// Domain
pub use types::{ComplexityClass, ResponsePayload};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AdapterRegistry, Answer, Dispatcher, HealthCheck, HealthReport, Orchestrator,
    ResponseAdapter, SelectionStats, SpeechSynthesizer,
};

// =============================================================================
// Routing Re-exports
// =============================================================================

pub use routing::{ComplexityScore, ProviderDefinition, classify, select};
