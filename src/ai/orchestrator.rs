//! Response Orchestrator
//!
//! End-to-end flow for one question:
//!
//! ```text
//! question → classify → select → dispatch ─┬─ audio ─────────────→ Answer
//!                          ↑               ├─ text + engine → TTS → Answer
//!                          └── fallback ←──┘ (failure / timeout)
//! ```
//!
//! The snapshot is captured once per question, so a reload mid-request never
//! changes the pools a request is working from. Fallback walks the same pool
//! by priority, at most `maxRetries` extra attempts, and only when
//! `fallbackOnError` is set. Speech synthesis failures are final.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::dispatcher::Dispatcher;
use super::health::{HealthCheck, HealthReport};
use super::http;
use super::provider::AdapterRegistry;
use super::stats::{Outcome, SelectionStats};
use super::timeout::spawn_with_timeout;
use super::tts::SpeechSynthesizer;
use crate::config::{ConfigSnapshot, Settings, SnapshotStore};
use crate::routing::{ProviderDefinition, classify, fallback_candidates, select};
use crate::types::{
    ComplexityClass, ErrorCategory, RequestId, ResponsePayload, Result, VendorError, VoxError,
};

/// Payload plus how it was produced
#[derive(Debug, Clone)]
pub struct Answer {
    pub request_id: RequestId,
    pub payload: ResponsePayload,
    /// Provider that produced the answer
    pub provider: String,
    pub class: ComplexityClass,
    /// Vendor calls made, including the successful one
    pub attempts: u32,
    /// Speech engine used for text answers
    pub speech_engine: Option<String>,
    pub elapsed: Duration,
}

pub struct Orchestrator {
    store: SnapshotStore,
    dispatcher: Dispatcher,
    synthesizer: SpeechSynthesizer,
    stats: Arc<SelectionStats>,
}

impl Orchestrator {
    pub fn new(store: SnapshotStore, dispatcher: Dispatcher, synthesizer: SpeechSynthesizer) -> Self {
        Self {
            store,
            dispatcher,
            synthesizer,
            stats: Arc::new(SelectionStats::new()),
        }
    }

    /// Wire the built-in adapters to the routing document named by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = http::build_client(Duration::from_secs(settings.connect_timeout_secs))?;
        let store = SnapshotStore::open(settings.routing_path.clone(), settings.reload_enabled)?;
        Ok(Self::new(
            store,
            Dispatcher::new(AdapterRegistry::with_defaults(client.clone())),
            SpeechSynthesizer::new(client),
        ))
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn stats(&self) -> &SelectionStats {
        &self.stats
    }

    /// Probe the current snapshot's providers and speech engines
    pub async fn health(&self) -> HealthReport {
        HealthCheck::new(self.dispatcher.registry().clone(), self.synthesizer.clone())
            .run(self.store.current())
            .await
    }

    /// Answer `question` with a provider drawn from the thread RNG
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let snapshot = self.store.current();
        let class = classify(question, &snapshot.classifier);
        let selected = select(&snapshot, class, &mut rand::rng())?;
        self.respond(question, snapshot, class, selected).await
    }

    /// Answer `question` with a caller-supplied RNG
    pub async fn ask_with_rng<R: Rng + Send>(&self, question: &str, rng: &mut R) -> Result<Answer> {
        let snapshot = self.store.current();
        let class = classify(question, &snapshot.classifier);
        let selected = select(&snapshot, class, rng)?;
        self.respond(question, snapshot, class, selected).await
    }

    /// Dispatch starting from an already selected definition
    #[instrument(
        skip(self, question, snapshot, selected),
        fields(request_id = tracing::field::Empty, class = %class, selected = %selected.name)
    )]
    pub async fn respond(
        &self,
        question: &str,
        snapshot: Arc<ConfigSnapshot>,
        class: ComplexityClass,
        selected: ProviderDefinition,
    ) -> Result<Answer> {
        let request_id = RequestId::generate();
        tracing::Span::current().record("request_id", request_id.as_str());
        let start = Instant::now();

        let selection = &snapshot.selection;
        let retry_budget = if selection.fallback_on_error {
            selection.max_retries
        } else {
            0
        };

        let mut tried: Vec<String> = Vec::new();
        let mut current = self.first_usable(&snapshot, class, selected, &mut tried)?;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tried.push(current.name.clone());
            self.note_selection(&snapshot, &current, class, &request_id, attempts);

            let call_start = Instant::now();
            let result = self
                .dispatcher
                .dispatch(question, current.clone(), Arc::clone(&snapshot))
                .await;
            let call_elapsed = call_start.elapsed();

            let err = match result {
                Ok(payload) => {
                    self.note_outcome(&snapshot, &current.name, Outcome::Success, call_elapsed);
                    let (payload, speech_engine) =
                        self.normalize(payload, &current, &snapshot).await?;
                    let answer = Answer {
                        request_id,
                        payload,
                        provider: current.name,
                        class,
                        attempts,
                        speech_engine,
                        elapsed: start.elapsed(),
                    };
                    info!(
                        provider = %answer.provider,
                        attempts = answer.attempts,
                        audio = answer.payload.is_audio(),
                        elapsed_ms = answer.elapsed.as_millis() as u64,
                        "Question answered"
                    );
                    return Ok(answer);
                }
                Err(err) => err,
            };

            let outcome = if matches!(err, VoxError::DispatchTimeout { .. }) {
                Outcome::Timeout
            } else {
                Outcome::Failure
            };
            self.note_outcome(&snapshot, &current.name, outcome, call_elapsed);

            if !err.allows_fallback() || attempts > retry_budget {
                warn!(provider = %current.name, attempts, error = %err, "Giving up");
                return Err(err);
            }

            let excluded: Vec<&str> = tried.iter().map(String::as_str).collect();
            let next = fallback_candidates(&snapshot, class, &excluded)
                .into_iter()
                .find(ProviderDefinition::is_usable);
            match next {
                Some(next) => {
                    warn!(
                        failed = %current.name,
                        next = %next.name,
                        error = %err,
                        "Falling back to next provider"
                    );
                    current = next;
                }
                None => {
                    warn!(provider = %current.name, error = %err, "No fallback candidate left");
                    return Err(err);
                }
            }
        }
    }

    /// `selected` if usable, else the best usable entry of the pool. No vendor
    /// call is made for skipped entries, so this does not consume retries.
    fn first_usable(
        &self,
        snapshot: &ConfigSnapshot,
        class: ComplexityClass,
        selected: ProviderDefinition,
        skipped: &mut Vec<String>,
    ) -> Result<ProviderDefinition> {
        let Some(reason) = selected.unusable_reason() else {
            return Ok(selected);
        };
        warn!(provider = %selected.name, reason = %reason, "Selected provider is unusable");
        skipped.push(selected.name);

        let excluded: Vec<&str> = skipped.iter().map(String::as_str).collect();
        for candidate in fallback_candidates(snapshot, class, &excluded) {
            match candidate.unusable_reason() {
                None => return Ok(candidate),
                Some(reason) => {
                    debug!(provider = %candidate.name, reason = %reason, "Skipping unusable provider");
                }
            }
        }
        Err(VoxError::no_provider(
            class,
            format!("no usable entry in {}", class.pool_key()),
        ))
    }

    /// Audio passes through; text is spoken when the definition names an
    /// engine and returned as text otherwise
    async fn normalize(
        &self,
        payload: ResponsePayload,
        definition: &ProviderDefinition,
        snapshot: &Arc<ConfigSnapshot>,
    ) -> Result<(ResponsePayload, Option<String>)> {
        let text = match payload {
            ResponsePayload::Text(text) if definition.needs_tts() => text,
            other => return Ok((other, None)),
        };
        let Some(engine) = definition.tts_provider.clone() else {
            return Ok((ResponsePayload::Text(text), None));
        };

        let audio = self
            .speak(text, &engine, definition.voice.clone(), Arc::clone(snapshot))
            .await?;
        Ok((ResponsePayload::Audio(audio), Some(engine)))
    }

    /// Synthesize on its own task under the snapshot timeout
    async fn speak(
        &self,
        text: String,
        engine: &str,
        voice: Option<String>,
        snapshot: Arc<ConfigSnapshot>,
    ) -> Result<String> {
        let budget = snapshot.selection.timeout;
        let token = CancellationToken::new();
        let cancel = token.clone();
        let synthesizer = self.synthesizer.clone();
        let engine_name = engine.to_string();

        let result = spawn_with_timeout(
            budget,
            token,
            async move {
                synthesizer
                    .synthesize(&engine_name, &text, voice.as_deref(), &snapshot.tts, &cancel)
                    .await
                    .map_err(VoxError::TtsFailure)
            },
            engine,
        )
        .await;

        result.map_err(|err| match err {
            VoxError::DispatchTimeout { provider, timeout } => VoxError::TtsFailure(VendorError::new(
                ErrorCategory::Transient,
                format!("no audio after {:?}", timeout),
                provider,
            )),
            VoxError::DispatchFailure(e) => VoxError::TtsFailure(e),
            other => other,
        })
    }

    fn note_selection(
        &self,
        snapshot: &ConfigSnapshot,
        definition: &ProviderDefinition,
        class: ComplexityClass,
        request_id: &RequestId,
        attempt: u32,
    ) {
        if snapshot.statistics.enabled {
            self.stats.record_selection(&definition.name, class);
        }
        if snapshot.statistics.log_selections {
            info!(
                request_id = %request_id,
                provider = %definition.name,
                model = %definition.model,
                class = %class,
                attempt,
                "Provider selected"
            );
        }
    }

    fn note_outcome(
        &self,
        snapshot: &ConfigSnapshot,
        provider: &str,
        outcome: Outcome,
        elapsed: Duration,
    ) {
        if snapshot.statistics.enabled {
            self.stats.record_outcome(provider, outcome, elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::test_support::{MockAdapter, MockBehavior, serve};
    use crate::config::sample_document;
    use axum::{Json, Router, routing::post};
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;

    struct Harness {
        orchestrator: Orchestrator,
        snapshot: Arc<ConfigSnapshot>,
    }

    /// Sample snapshot with both speech engines pointed at a local mock
    async fn harness(registry: AdapterRegistry, tweak: impl FnOnce(&mut ConfigSnapshot)) -> Harness {
        let base = serve(
            Router::new()
                .route("/azure", post(|| async { vec![0x49u8, 0x44, 0x33] }))
                .route(
                    "/google",
                    post(|| async { Json(json!({"audioContent": "R09P"})) }),
                ),
        )
        .await;

        let mut snapshot = ConfigSnapshot::from_document(sample_document(), None).unwrap();
        if let Some(azure) = snapshot.tts.azure.as_mut() {
            azure.endpoint = Some(format!("{}/azure", base));
        }
        if let Some(google) = snapshot.tts.google.as_mut() {
            google.endpoint = Some(format!("{}/google", base));
        }
        tweak(&mut snapshot);

        let store = SnapshotStore::from_snapshot(snapshot);
        let snapshot = store.current();
        let client = reqwest::Client::new();
        Harness {
            orchestrator: Orchestrator::new(
                store,
                Dispatcher::new(registry),
                SpeechSynthesizer::new(client),
            ),
            snapshot,
        }
    }

    fn definition(snapshot: &ConfigSnapshot, name: &str, class: ComplexityClass) -> ProviderDefinition {
        ProviderDefinition::materialize(name, class, &snapshot.pool(class)[name])
    }

    #[tokio::test]
    async fn test_simple_question_gets_adapter_audio() {
        let mut registry = AdapterRegistry::new();
        registry.register(
            "openai_realtime",
            MockAdapter::new(MockBehavior::Reply(ResponsePayload::Audio("T1BFTg==".into()))),
        );
        registry.register(
            "gemini_live",
            MockAdapter::new(MockBehavior::Reply(ResponsePayload::Audio("R0VN".into()))),
        );
        let h = harness(registry, |_| {}).await;

        let answer = h
            .orchestrator
            .ask_with_rng("Quelle heure est-il ?", &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();
        assert_eq!(answer.class, ComplexityClass::SimpleAudio);
        assert!(answer.payload.is_audio());
        assert_eq!(answer.attempts, 1);
        assert!(answer.speech_engine.is_none());
        assert_eq!(h.orchestrator.stats().summary().total_selections, 1);
    }

    #[tokio::test]
    async fn test_text_answer_is_spoken_by_configured_engine() {
        let mut registry = AdapterRegistry::new();
        registry.register("claude", MockAdapter::text("Diffusion de Rayleigh."));
        let h = harness(registry, |_| {}).await;

        let selected = definition(&h.snapshot, "claude", ComplexityClass::ComplexText);
        let answer = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap();
        assert_eq!(answer.payload, ResponsePayload::Audio("SUQz".to_string()));
        assert_eq!(answer.speech_engine.as_deref(), Some("azure"));
        assert_eq!(answer.provider, "claude");
    }

    #[tokio::test]
    async fn test_fallback_to_next_priority() {
        let claude = MockAdapter::new(MockBehavior::Fail(ErrorCategory::Transient));
        let mistral = MockAdapter::text("Bonjour.");
        let mut registry = AdapterRegistry::new();
        registry.register("claude", claude.clone());
        registry.register("mistral", mistral.clone());
        let h = harness(registry, |_| {}).await;

        let selected = definition(&h.snapshot, "claude", ComplexityClass::ComplexText);
        let answer = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap();
        assert_eq!(answer.provider, "mistral");
        assert_eq!(answer.attempts, 2);
        assert_eq!(answer.payload, ResponsePayload::Audio("R09P".to_string()));
        assert_eq!(answer.speech_engine.as_deref(), Some("google"));
        assert_eq!((claude.calls(), mistral.calls()), (1, 1));

        let summary = h.orchestrator.stats().summary();
        let claude_stats = summary.providers.iter().find(|p| p.provider == "claude").unwrap();
        assert_eq!(claude_stats.failures, 1);
    }

    #[tokio::test]
    async fn test_no_fallback_when_disabled() {
        let mistral = MockAdapter::text("Bonjour.");
        let mut registry = AdapterRegistry::new();
        registry.register("claude", MockAdapter::new(MockBehavior::Fail(ErrorCategory::Auth)));
        registry.register("mistral", mistral.clone());
        let h = harness(registry, |s| s.selection.fallback_on_error = false).await;

        let selected = definition(&h.snapshot, "claude", ComplexityClass::ComplexText);
        let err = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::DispatchFailure(ref e) if e.provider == "claude"));
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test]
    async fn test_retries_bounded_by_max_retries() {
        let openai = MockAdapter::new(MockBehavior::Fail(ErrorCategory::Transient));
        let gemini = MockAdapter::new(MockBehavior::Fail(ErrorCategory::Transient));
        let copilot = MockAdapter::new(MockBehavior::Fail(ErrorCategory::Transient));
        let mut registry = AdapterRegistry::new();
        registry.register("openai_realtime", openai.clone());
        registry.register("gemini_live", gemini.clone());
        registry.register("copilot_speech", copilot.clone());
        let h = harness(registry, |s| {
            s.audio_providers["copilot_speech"].enabled = Some(true);
            s.selection.max_retries = 1;
        })
        .await;

        let selected = definition(&h.snapshot, "openai_realtime", ComplexityClass::SimpleAudio);
        let err = h
            .orchestrator
            .respond("Bonjour", Arc::clone(&h.snapshot), ComplexityClass::SimpleAudio, selected)
            .await
            .unwrap_err();
        assert!(err.allows_fallback());
        assert_eq!(openai.calls() + gemini.calls() + copilot.calls(), 2);
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let mut registry = AdapterRegistry::new();
        registry.register("claude", MockAdapter::new(MockBehavior::Hang));
        registry.register("mistral", MockAdapter::text("Bonjour."));
        let h = harness(registry, |s| s.selection.timeout = Duration::from_millis(50)).await;

        let selected = definition(&h.snapshot, "claude", ComplexityClass::ComplexText);
        let answer = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap();
        assert_eq!(answer.provider, "mistral");
        let summary = h.orchestrator.stats().summary();
        let claude = summary.providers.iter().find(|p| p.provider == "claude").unwrap();
        assert_eq!(claude.timeouts, 1);
    }

    #[tokio::test]
    async fn test_tts_failure_is_final() {
        let mistral = MockAdapter::text("Bonjour.");
        let mut registry = AdapterRegistry::new();
        registry.register("claude", MockAdapter::text("Parce que."));
        registry.register("mistral", mistral.clone());
        let h = harness(registry, |s| {
            if let Some(azure) = s.tts.azure.as_mut() {
                azure.api_key = None;
            }
        })
        .await;

        let selected = definition(&h.snapshot, "claude", ComplexityClass::ComplexText);
        let err = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::TtsFailure(ref e) if e.provider == "azure"));
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test]
    async fn test_unusable_selection_skips_to_usable_entry() {
        let mut registry = AdapterRegistry::new();
        registry.register("claude", MockAdapter::text("Parce que."));
        registry.register("mistral", MockAdapter::text("Bonjour."));
        let h = harness(registry, |s| {
            s.text_providers["mistral"].mode = Some(crate::types::ProviderMode::Direct);
        })
        .await;

        let selected = definition(&h.snapshot, "mistral", ComplexityClass::ComplexText);
        assert!(!selected.is_usable());
        let answer = h
            .orchestrator
            .respond("Pourquoi ?", Arc::clone(&h.snapshot), ComplexityClass::ComplexText, selected)
            .await
            .unwrap();
        assert_eq!(answer.provider, "claude");
        assert_eq!(answer.attempts, 1);
    }

    #[tokio::test]
    async fn test_empty_pool_is_no_provider() {
        let h = harness(AdapterRegistry::new(), |s| {
            for entry in s.audio_providers.values_mut() {
                entry.enabled = Some(false);
            }
        })
        .await;

        let err = h
            .orchestrator
            .ask_with_rng("Quelle heure est-il ?", &mut StdRng::seed_from_u64(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VoxError::NoProviderAvailable { class: ComplexityClass::SimpleAudio, .. }
        ));
    }
}
