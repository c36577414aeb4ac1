//! Health Checks
//!
//! Out-of-band probes, never run on the request path:
//!
//! - every enabled provider: usability, adapter registration, then a short
//!   text completion through the adapter
//! - every speech engine: a one-word synthesis when configured
//!
//! Probes run concurrently, each bounded by its own budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::AdapterRegistry;
use super::tts::SpeechSynthesizer;
use crate::config::{ConfigSnapshot, KNOWN_TTS_ENGINES};
use crate::constants::network::HEALTH_PROBE_TIMEOUT_SECS;
use crate::routing::ProviderDefinition;

/// Aggregated probe results
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// No probe failed
    pub passed: bool,
    pub checks: Vec<CheckResult>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self {
            passed: true,
            checks: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_check(&mut self, check: CheckResult) {
        if !check.passed {
            self.passed = false;
            self.errors.push(format!("{}: {}", check.name, check.message));
        }
        if let Some(ref warn) = check.warning {
            self.warnings.push(format!("{}: {}", check.name, warn));
        }
        self.checks.push(check);
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl Default for HealthReport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Provider,
    Speech,
}

/// Individual probe result
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub kind: CheckKind,
    pub passed: bool,
    pub message: String,
    pub warning: Option<String>,
    pub duration_ms: u64,
}

impl CheckResult {
    fn passed(name: String, kind: CheckKind, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name,
            kind,
            passed: true,
            message: message.into(),
            warning: None,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn failed(name: String, kind: CheckKind, message: impl Into<String>, start: Instant) -> Self {
        Self {
            passed: false,
            ..Self::passed(name, kind, message, start)
        }
    }
}

/// Provider and speech engine prober
#[derive(Debug, Clone)]
pub struct HealthCheck {
    registry: AdapterRegistry,
    synthesizer: SpeechSynthesizer,
    timeout: Duration,
}

impl HealthCheck {
    pub fn new(registry: AdapterRegistry, synthesizer: SpeechSynthesizer) -> Self {
        Self {
            registry,
            synthesizer,
            timeout: Duration::from_secs(HEALTH_PROBE_TIMEOUT_SECS),
        }
    }

    /// Per-probe budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe every enabled provider and every speech engine
    pub async fn run(&self, snapshot: Arc<ConfigSnapshot>) -> HealthReport {
        info!(timeout_ms = self.timeout.as_millis() as u64, "Running health checks");

        let provider_probes = snapshot.enabled_providers().map(|(class, name, entry)| {
            let definition = ProviderDefinition::materialize(name, class, entry);
            self.probe_provider(definition, Arc::clone(&snapshot))
        });
        let engine_probes = KNOWN_TTS_ENGINES
            .iter()
            .map(|engine| self.probe_engine(engine, Arc::clone(&snapshot)));

        let (providers, engines) = tokio::join!(join_all(provider_probes), join_all(engine_probes));

        let mut report = HealthReport::new();
        for check in providers.into_iter().chain(engines) {
            report.add_check(check);
        }

        if report.passed {
            info!(checks = report.checks.len(), "All health checks passed");
        } else {
            warn!(failed = report.failed_count(), "Health checks failed");
        }
        report
    }

    async fn probe_provider(
        &self,
        definition: ProviderDefinition,
        snapshot: Arc<ConfigSnapshot>,
    ) -> CheckResult {
        let name = definition.name.clone();
        let start = Instant::now();

        if let Some(reason) = definition.unusable_reason() {
            return CheckResult::failed(name, CheckKind::Provider, reason, start);
        }
        let Some(adapter) = self.registry.get(&definition.name) else {
            return CheckResult::failed(name, CheckKind::Provider, "no adapter registered", start);
        };

        debug!(provider = %name, adapter = adapter.name(), "Probing provider");
        match tokio::time::timeout(self.timeout, adapter.health_check(&definition, snapshot)).await
        {
            Ok(Ok(())) => CheckResult::passed(name, CheckKind::Provider, "reachable", start),
            Ok(Err(e)) => CheckResult::failed(name, CheckKind::Provider, e.to_string(), start),
            Err(_) => CheckResult::failed(
                name,
                CheckKind::Provider,
                format!("no answer within {:?}", self.timeout),
                start,
            ),
        }
    }

    async fn probe_engine(&self, engine: &str, snapshot: Arc<ConfigSnapshot>) -> CheckResult {
        let name = format!("tts:{}", engine);
        let start = Instant::now();

        if !snapshot.tts.is_configured(engine) {
            let mut check = CheckResult::passed(name, CheckKind::Speech, "not configured", start);
            check.warning = Some("engine not configured, skipped".to_string());
            return check;
        }

        let cancel = CancellationToken::new();
        let synthesis = self
            .synthesizer
            .synthesize(engine, "Bonjour", None, &snapshot.tts, &cancel);
        match tokio::time::timeout(self.timeout, synthesis).await {
            Ok(Ok(_)) => CheckResult::passed(name, CheckKind::Speech, "synthesized", start),
            Ok(Err(e)) => CheckResult::failed(name, CheckKind::Speech, e.to_string(), start),
            Err(_) => {
                cancel.cancel();
                CheckResult::failed(
                    name,
                    CheckKind::Speech,
                    format!("no audio within {:?}", self.timeout),
                    start,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::test_support::{MockAdapter, MockBehavior, serve};
    use crate::types::ErrorCategory;
    use axum::{Router, routing::post};

    async fn snapshot_with_local_azure() -> Arc<ConfigSnapshot> {
        let base = serve(Router::new().route("/azure", post(|| async { vec![1u8, 2, 3] }))).await;
        let mut snapshot =
            ConfigSnapshot::from_document(crate::config::sample_document(), None).unwrap();
        if let Some(azure) = snapshot.tts.azure.as_mut() {
            azure.endpoint = Some(format!("{}/azure", base));
        }
        snapshot.tts.google = None;
        Arc::new(snapshot)
    }

    #[tokio::test]
    async fn test_report_covers_providers_and_engines() {
        let mut registry = AdapterRegistry::new();
        registry.register("openai_realtime", MockAdapter::text("ok"));
        registry.register("claude", MockAdapter::text("ok"));
        registry.register("mistral", MockAdapter::new(MockBehavior::Fail(ErrorCategory::Auth)));

        let report = HealthCheck::new(registry, SpeechSynthesizer::new(reqwest::Client::new()))
            .run(snapshot_with_local_azure().await)
            .await;

        assert!(!report.passed);
        // four enabled providers plus two engines; copilot_speech is disabled
        assert_eq!(report.checks.len(), 6);
        assert!(report.check("openai_realtime").unwrap().passed);
        assert!(report.check("claude").unwrap().passed);
        assert!(!report.check("mistral").unwrap().passed);
        assert_eq!(
            report.check("gemini_live").unwrap().message,
            "no adapter registered"
        );
        assert!(report.check("tts:azure").unwrap().passed);

        let google = report.check("tts:google").unwrap();
        assert!(google.passed);
        assert!(google.warning.is_some());
        assert_eq!(report.failed_count(), 2);
    }

    #[tokio::test]
    async fn test_hanging_probe_is_bounded() {
        let mut registry = AdapterRegistry::new();
        for name in ["openai_realtime", "gemini_live", "claude", "mistral"] {
            registry.register(name, MockAdapter::new(MockBehavior::Hang));
        }

        let start = Instant::now();
        let report = HealthCheck::new(registry, SpeechSynthesizer::new(reqwest::Client::new()))
            .with_timeout(Duration::from_millis(50))
            .run(snapshot_with_local_azure().await)
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(report.check("claude").unwrap().message.starts_with("no answer within"));
        assert!(report.failed_count() >= 4);
    }
}
