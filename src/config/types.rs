//! Routing Document Types
//!
//! Raw, camelCase structures mirroring the routing document on disk (JSON or
//! TOML). Every field is optional here; [`super::ConfigSnapshot`] applies
//! defaults and validation. Provider pools are [`IndexMap`]s so the roulette
//! walk follows document order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::selection::POOL_DEFAULT_WEIGHT;
use crate::types::{ProviderMode, ResponseFormat};

/// Ordered `name -> entry` pool
pub type ProviderPool = IndexMap<String, ProviderEntry>;

/// Root of the routing document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDocument {
    pub audio_providers: Option<ProviderPool>,
    pub text_providers: Option<ProviderPool>,
    pub question_analysis: Option<QuestionAnalysis>,
    pub tts_services: Option<TtsServices>,
    pub ai_selection_config: Option<SelectionConfig>,
    pub statistics_tracking: Option<StatisticsTracking>,
}

// =============================================================================
// Provider Entries
// =============================================================================

/// One provider entry as written in a pool
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
    pub weight: Option<i64>,
    pub mode: Option<ProviderMode>,
    /// Raw credential, possibly a `${ENV}` reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub voice: Option<String>,
    pub response_format: Option<ResponseFormat>,
    pub tts_provider: Option<String>,
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    pub system_prompt: Option<String>,
}

impl ProviderEntry {
    /// `enabled` absent means enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Weight used by the roulette walk
    pub fn pool_weight(&self) -> u32 {
        self.weight
            .and_then(|w| u32::try_from(w).ok())
            .unwrap_or(POOL_DEFAULT_WEIGHT)
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .field("weight", &self.weight)
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("response_format", &self.response_format)
            .field("tts_provider", &self.tts_provider)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Question Analysis
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    #[serde(default)]
    pub complexity_keywords: Vec<String>,
    #[serde(default)]
    pub simple_keywords: Vec<String>,
    pub complexity_threshold: Option<i32>,
    /// Overrides the built-in reasoning-request pattern
    pub reasoning_pattern: Option<String>,
}

// =============================================================================
// Speech Synthesis Services
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsServices {
    pub azure: Option<AzureTtsConfig>,
    pub google: Option<GoogleTtsConfig>,
    /// Rewrite abbreviations and symbols before synthesis
    #[serde(default)]
    pub optimize_text: bool,
}

/// SSML engine settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureTtsConfig {
    /// Region, possibly a `${ENV}` reference
    pub region: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub default_voice: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_azure_pitch")]
    pub pitch: String,
    pub language: Option<String>,
    /// Full URL replacing the regional endpoint
    pub endpoint: Option<String>,
}

/// JSON engine settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTtsConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub default_voice: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub pitch: f64,
    pub language_code: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub volume_gain_db: f64,
    /// Full URL replacing the public synthesize endpoint
    pub endpoint: Option<String>,
}

fn default_speed() -> f64 {
    1.0
}

fn default_azure_pitch() -> String {
    "default".to_string()
}

impl Default for AzureTtsConfig {
    fn default() -> Self {
        Self {
            region: None,
            api_key: None,
            default_voice: None,
            speed: default_speed(),
            pitch: default_azure_pitch(),
            language: None,
            endpoint: None,
        }
    }
}

impl Default for GoogleTtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_voice: None,
            speed: default_speed(),
            pitch: 0.0,
            language_code: None,
            gender: None,
            volume_gain_db: 0.0,
            endpoint: None,
        }
    }
}

impl std::fmt::Debug for AzureTtsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTtsConfig")
            .field("region", &self.region)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_voice", &self.default_voice)
            .field("speed", &self.speed)
            .field("pitch", &self.pitch)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for GoogleTtsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTtsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_voice", &self.default_voice)
            .field("speed", &self.speed)
            .field("pitch", &self.pitch)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Global Selection & Statistics
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
    pub timeout_ms: Option<u64>,
    pub fallback_on_error: Option<bool>,
    pub max_retries: Option<u32>,
    pub reload_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatisticsTracking {
    pub enabled: bool,
    pub log_selections: bool,
}

impl Default for StatisticsTracking {
    fn default() -> Self {
        Self {
            enabled: true,
            log_selections: true,
        }
    }
}
