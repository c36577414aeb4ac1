//! Vendor Adapters
//!
//! Defines the [`ResponseAdapter`] trait and the capability-keyed
//! [`AdapterRegistry`]. Each adapter turns a question plus a
//! [`ProviderDefinition`] into a [`ResponsePayload`]:
//!
//! - audio adapters (`openai_realtime`, `gemini_live`, `copilot_speech`)
//!   complete the question, then convert the answer to speech when the
//!   definition is audio-capable
//! - text adapters (`claude`, `mistral`, `openai_text`) return text
//!
//! All HTTP calls observe the request's cancellation token.

mod chat;
mod claude;
mod copilot;
mod gemini;
mod mistral;
mod openai;
mod registry;

pub use claude::ClaudeAdapter;
pub use copilot::CopilotAdapter;
pub use gemini::GeminiAdapter;
pub use mistral::MistralAdapter;
pub use openai::OpenAiAdapter;
pub use registry::AdapterRegistry;

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::ConfigSnapshot;
use crate::constants::DEFAULT_SYSTEM_PROMPT;
use crate::routing::ProviderDefinition;
use crate::types::{ResponseFormat, ResponsePayload, VendorError};

/// Everything an adapter needs for one call. Owned, so the call can run on
/// its own task.
#[derive(Debug, Clone)]
pub struct AdapterRequest {
    pub question: String,
    pub definition: ProviderDefinition,
    pub snapshot: Arc<ConfigSnapshot>,
    pub cancel: CancellationToken,
}

impl AdapterRequest {
    pub fn new(
        question: impl Into<String>,
        definition: ProviderDefinition,
        snapshot: Arc<ConfigSnapshot>,
    ) -> Self {
        Self {
            question: question.into(),
            definition,
            snapshot,
            cancel: CancellationToken::new(),
        }
    }

    /// Provider name used in errors and logs
    pub fn provider(&self) -> &str {
        &self.definition.name
    }

    pub fn system_prompt(&self) -> &str {
        self.definition
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Credential, required by every vendor call
    pub fn credential(&self) -> Result<SecretString, VendorError> {
        self.definition
            .credential()
            .ok_or_else(|| VendorError::misconfigured("no resolvable apiKey", self.provider()))
    }

    /// Configured endpoint, or the vendor default
    pub fn base_url(&self, default: &str) -> String {
        self.definition
            .resolved_endpoint()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Vendor adapter
#[async_trait]
pub trait ResponseAdapter: Send + Sync {
    /// Answer the question; audio when the definition is audio-capable and
    /// the adapter can speak, text otherwise
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError>;

    /// Adapter name for logging
    fn name(&self) -> &str;

    /// Out-of-band probe: a short text-only completion
    async fn health_check(
        &self,
        definition: &ProviderDefinition,
        snapshot: Arc<ConfigSnapshot>,
    ) -> Result<(), VendorError> {
        let mut probe = definition.clone();
        probe.response_format = ResponseFormat::Text;
        probe.max_tokens = 10;
        self.complete(&AdapterRequest::new("Bonjour", probe, snapshot))
            .await
            .map(|_| ())
    }
}

/// Shared adapter type for concurrent dispatch
pub type SharedAdapter = Arc<dyn ResponseAdapter>;

/// Adapters whose answers are spoken by the adapter itself
pub const AUDIO_ADAPTERS: &[&str] = &["openai_realtime", "gemini_live", "copilot_speech"];

/// Adapters that only ever return text
pub const TEXT_ADAPTERS: &[&str] = &["claude", "mistral", "openai_text"];

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::Router;

    /// Bind `router` on an ephemeral port and return its base URL
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Request against the sample snapshot with `endpoint` overriding the
    /// vendor URL
    pub(crate) fn request_for(
        pool_entry: &str,
        class: crate::types::ComplexityClass,
        endpoint: &str,
    ) -> AdapterRequest {
        let snapshot =
            ConfigSnapshot::from_document(crate::config::sample_document(), None).unwrap();
        let entry = snapshot.pool(class)[pool_entry].clone();
        let mut definition = ProviderDefinition::materialize(pool_entry, class, &entry);
        definition.endpoint = Some(endpoint.to_string());
        definition.api_key = Some("test-key".to_string());
        AdapterRequest::new("Pourquoi le ciel est bleu ?", definition, Arc::new(snapshot))
    }

    /// Scripted adapter for dispatcher and orchestrator tests
    #[derive(Debug, Clone)]
    pub(crate) enum MockBehavior {
        Reply(ResponsePayload),
        Fail(crate::types::ErrorCategory),
        /// Wait until cancelled
        Hang,
    }

    #[derive(Debug)]
    pub(crate) struct MockAdapter {
        behavior: MockBehavior,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl MockAdapter {
        pub(crate) fn new(behavior: MockBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: std::sync::atomic::AtomicUsize::new(0),
            })
        }

        pub(crate) fn text(answer: &str) -> Arc<Self> {
            Self::new(MockBehavior::Reply(ResponsePayload::Text(answer.to_string())))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResponseAdapter for MockAdapter {
        async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Reply(payload) => Ok(payload.clone()),
                MockBehavior::Fail(category) => Err(VendorError::new(
                    *category,
                    "scripted failure",
                    request.provider(),
                )),
                MockBehavior::Hang => {
                    request.cancel.cancelled().await;
                    Err(VendorError::cancelled(request.provider()))
                }
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}
