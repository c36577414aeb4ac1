//! AI Response Layer
//!
//! Vendor adapters, bounded dispatch, speech synthesis and the orchestrator
//! that ties them to the routing decisions.

pub mod dispatcher;
pub mod health;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod stats;
pub mod timeout;
pub mod tts;

pub use dispatcher::Dispatcher;
pub use health::{CheckKind, CheckResult, HealthCheck, HealthReport};
pub use orchestrator::{Answer, Orchestrator};
pub use provider::{AdapterRegistry, AdapterRequest, ResponseAdapter, SharedAdapter};
pub use stats::{Outcome, ProviderStats, SelectionStats, StatsSummary};
pub use timeout::{spawn_with_timeout, with_timeout};
pub use tts::{SpeechSynthesizer, optimize_for_speech};
