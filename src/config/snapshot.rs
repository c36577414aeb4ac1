//! Configuration Snapshot
//!
//! Validated, immutable view of a routing document. A snapshot is built once
//! per load, published behind an `Arc`, and never mutated afterwards.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use std::time::Duration;

use super::types::{
    AzureTtsConfig, GoogleTtsConfig, ProviderEntry, ProviderPool, RoutingDocument,
    StatisticsTracking,
};
use crate::constants::{classifier, dispatch};
use crate::types::{ComplexityClass, ProviderMode, Result, VoxError};

/// Speech engines the normalizer knows about
pub const KNOWN_TTS_ENGINES: &[&str] = &["azure", "google"];

/// Classifier inputs, keywords lower-cased once at load
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub complex_keywords: Vec<String>,
    pub simple_keywords: Vec<String>,
    pub threshold: i32,
    pub reasoning_pattern: Regex,
}

impl ClassifierSettings {
    pub fn new(
        complex_keywords: Vec<String>,
        simple_keywords: Vec<String>,
        threshold: i32,
        reasoning_pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            complex_keywords: normalize_keywords(complex_keywords),
            simple_keywords: normalize_keywords(simple_keywords),
            threshold,
            reasoning_pattern: compile_reasoning_pattern(reasoning_pattern)?,
        })
    }
}

/// Speech engine settings
#[derive(Debug, Clone, Default)]
pub struct TtsSettings {
    pub azure: Option<AzureTtsConfig>,
    pub google: Option<GoogleTtsConfig>,
    pub optimize_text: bool,
}

impl TtsSettings {
    pub fn is_configured(&self, engine: &str) -> bool {
        match engine {
            "azure" => self.azure.is_some(),
            "google" => self.google.is_some(),
            _ => false,
        }
    }
}

/// Dispatch and reload behaviour
#[derive(Debug, Clone)]
pub struct SelectionSettings {
    pub timeout: Duration,
    pub fallback_on_error: bool,
    pub max_retries: u32,
    pub reload_interval: Duration,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(dispatch::DEFAULT_TIMEOUT_MS),
            fallback_on_error: true,
            max_retries: dispatch::DEFAULT_MAX_RETRIES,
            reload_interval: Duration::from_millis(dispatch::DEFAULT_RELOAD_INTERVAL_MS),
        }
    }
}

/// Validated routing configuration
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub audio_providers: ProviderPool,
    pub text_providers: ProviderPool,
    pub classifier: ClassifierSettings,
    pub tts: TtsSettings,
    pub selection: SelectionSettings,
    pub statistics: StatisticsTracking,
    pub source: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
}

impl ConfigSnapshot {
    /// Validate a raw document.
    ///
    /// Missing sections or required entry fields yield `ConfigurationMissing`;
    /// out-of-range values yield `ConfigurationInvalid`.
    pub fn from_document(doc: RoutingDocument, source: Option<PathBuf>) -> Result<Self> {
        let audio_providers = doc
            .audio_providers
            .ok_or_else(|| VoxError::missing("audioProviders section"))?;
        let text_providers = doc
            .text_providers
            .ok_or_else(|| VoxError::missing("textProviders section"))?;
        let analysis = doc
            .question_analysis
            .ok_or_else(|| VoxError::missing("questionAnalysis section"))?;
        let services = doc.tts_services.unwrap_or_default();

        let tts = TtsSettings {
            azure: services.azure,
            google: services.google,
            optimize_text: services.optimize_text,
        };

        for (class, pool) in [
            (ComplexityClass::SimpleAudio, &audio_providers),
            (ComplexityClass::ComplexText, &text_providers),
        ] {
            for (name, entry) in pool {
                validate_entry(class, name, entry, &tts)?;
            }
        }

        let threshold = analysis
            .complexity_threshold
            .unwrap_or(classifier::DEFAULT_THRESHOLD);
        let pattern = analysis
            .reasoning_pattern
            .as_deref()
            .unwrap_or(classifier::DEFAULT_REASONING_PATTERN);
        let classifier = ClassifierSettings::new(
            analysis.complexity_keywords,
            analysis.simple_keywords,
            threshold,
            pattern,
        )?;

        let raw = doc.ai_selection_config.unwrap_or_default();
        let defaults = SelectionSettings::default();
        let selection = SelectionSettings {
            timeout: match raw.timeout_ms {
                Some(0) => {
                    return Err(VoxError::invalid(
                        "aiSelectionConfig.timeoutMs must be greater than 0",
                    ));
                }
                Some(ms) => Duration::from_millis(ms),
                None => defaults.timeout,
            },
            fallback_on_error: raw.fallback_on_error.unwrap_or(defaults.fallback_on_error),
            max_retries: raw.max_retries.unwrap_or(defaults.max_retries),
            reload_interval: raw
                .reload_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reload_interval),
        };

        Ok(Self {
            audio_providers,
            text_providers,
            classifier,
            tts,
            selection,
            statistics: doc.statistics_tracking.unwrap_or_default(),
            source,
            loaded_at: Utc::now(),
        })
    }

    /// Pool backing a complexity class
    pub fn pool(&self, class: ComplexityClass) -> &ProviderPool {
        match class {
            ComplexityClass::SimpleAudio => &self.audio_providers,
            ComplexityClass::ComplexText => &self.text_providers,
        }
    }

    /// Enabled entry names across both pools, audio first
    pub fn enabled_providers(&self) -> impl Iterator<Item = (ComplexityClass, &str, &ProviderEntry)> {
        let audio = self
            .audio_providers
            .iter()
            .map(|(n, e)| (ComplexityClass::SimpleAudio, n.as_str(), e));
        let text = self
            .text_providers
            .iter()
            .map(|(n, e)| (ComplexityClass::ComplexText, n.as_str(), e));
        audio.chain(text).filter(|(_, _, e)| e.is_enabled())
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_entry(
    class: ComplexityClass,
    name: &str,
    entry: &ProviderEntry,
    tts: &TtsSettings,
) -> Result<()> {
    let field = |f: &str| format!("{}.{}.{}", class.pool_key(), name, f);

    if name.trim().is_empty() {
        return Err(VoxError::invalid(format!(
            "{} contains an entry with an empty name",
            class.pool_key()
        )));
    }

    if entry.model.as_deref().is_none_or(|m| m.trim().is_empty()) {
        return Err(VoxError::missing(field("model")));
    }
    if entry.api_key.is_none() {
        return Err(VoxError::missing(field("apiKey")));
    }

    if let Some(priority) = entry.priority
        && priority < 1
    {
        return Err(VoxError::invalid(format!(
            "{} must be at least 1, got {}",
            field("priority"),
            priority
        )));
    }
    if let Some(weight) = entry.weight
        && !(1..=i64::from(u32::MAX)).contains(&weight)
    {
        return Err(VoxError::invalid(format!(
            "{} must be at least 1, got {}",
            field("weight"),
            weight
        )));
    }

    if let Some(temperature) = entry.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(VoxError::invalid(format!(
            "{} must be between 0.0 and 2.0, got {}",
            field("temperature"),
            temperature
        )));
    }
    if entry.max_tokens == Some(0) {
        return Err(VoxError::invalid(format!(
            "{} must be greater than 0",
            field("maxTokens")
        )));
    }

    let endpoint = entry.endpoint.as_deref().map(str::trim).unwrap_or("");
    if entry.mode == Some(ProviderMode::Direct) && endpoint.is_empty() {
        return Err(VoxError::invalid(format!(
            "{} is required in direct mode",
            field("endpoint")
        )));
    }
    if endpoint.starts_with("http") {
        url::Url::parse(endpoint).map_err(|e| {
            VoxError::invalid(format!("{} is not a valid URL: {}", field("endpoint"), e))
        })?;
    }

    if let Some(engine) = entry.tts_provider.as_deref().map(str::trim)
        && !engine.is_empty()
    {
        let engine = engine.to_lowercase();
        if !KNOWN_TTS_ENGINES.contains(&engine.as_str()) {
            return Err(VoxError::invalid(format!(
                "{} names unknown engine '{}'. Valid values: {}",
                field("ttsProvider"),
                engine,
                KNOWN_TTS_ENGINES.join(", ")
            )));
        }
        if !tts.is_configured(&engine) {
            return Err(VoxError::missing(format!(
                "ttsServices.{} (referenced by {})",
                engine,
                field("ttsProvider")
            )));
        }
    }

    Ok(())
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn compile_reasoning_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| VoxError::invalid(format!("questionAnalysis.reasoningPattern: {}", e)))
}
