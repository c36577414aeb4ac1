//! Provider Definition
//!
//! Immutable, fully-defaulted description of one provider, built fresh from a
//! pool entry for every selection.

use indexmap::IndexMap;
use secrecy::SecretString;

use crate::config::{ProviderEntry, resolve_env_reference, resolve_secret};
use crate::constants::selection::{
    DEFAULT_MAX_TOKENS, DEFAULT_PRIORITY, DEFAULT_TEMPERATURE, MATERIALIZED_DEFAULT_WEIGHT,
};
use crate::types::{ComplexityClass, ProviderMode, ResponseFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDefinition {
    pub name: String,
    pub class: ComplexityClass,
    pub priority: u32,
    pub weight: u32,
    pub mode: ProviderMode,
    /// Raw credential reference, resolved at call time
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub voice: Option<String>,
    pub response_format: ResponseFormat,
    pub tts_provider: Option<String>,
    pub endpoint: Option<String>,
    pub headers: IndexMap<String, String>,
    pub system_prompt: Option<String>,
    pub enabled: bool,
}

impl ProviderDefinition {
    /// Apply defaults to a raw entry
    pub fn materialize(name: &str, class: ComplexityClass, entry: &ProviderEntry) -> Self {
        Self {
            name: name.to_string(),
            class,
            priority: entry
                .priority
                .and_then(|p| u32::try_from(p).ok())
                .unwrap_or(DEFAULT_PRIORITY),
            weight: entry
                .weight
                .and_then(|w| u32::try_from(w).ok())
                .unwrap_or(MATERIALIZED_DEFAULT_WEIGHT),
            mode: entry.mode.unwrap_or_default(),
            api_key: entry.api_key.clone(),
            model: entry.model.clone().unwrap_or_default(),
            max_tokens: entry.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: entry.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            voice: entry.voice.clone(),
            response_format: entry
                .response_format
                .unwrap_or_else(|| class.default_response_format()),
            tts_provider: entry
                .tts_provider
                .as_deref()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
            endpoint: entry.endpoint.clone(),
            headers: entry.headers.clone(),
            system_prompt: entry.system_prompt.clone(),
            enabled: entry.is_enabled(),
        }
    }

    pub fn is_audio_capable(&self) -> bool {
        self.response_format == ResponseFormat::Audio
    }

    pub fn needs_tts(&self) -> bool {
        self.response_format == ResponseFormat::Text && self.tts_provider.is_some()
    }

    /// Credential with any `${ENV}` reference resolved
    pub fn credential(&self) -> Option<SecretString> {
        resolve_secret(self.api_key.as_deref())
    }

    /// Endpoint with any `${ENV}` reference resolved
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint.as_deref().and_then(resolve_env_reference)
    }

    /// Why this definition cannot be dispatched, if it cannot
    pub fn unusable_reason(&self) -> Option<String> {
        if !self.enabled {
            return Some("disabled".to_string());
        }
        if self.name.trim().is_empty() {
            return Some("empty name".to_string());
        }
        if self.model.trim().is_empty() {
            return Some("empty model".to_string());
        }
        if self.priority < 1 || self.weight < 1 {
            return Some("priority and weight must be at least 1".to_string());
        }
        if self.mode == ProviderMode::Direct {
            if self.credential().is_none() {
                return Some("direct mode without a resolvable credential".to_string());
            }
            if self.resolved_endpoint().is_none() {
                return Some("direct mode without an endpoint".to_string());
            }
        }
        let format_ok = match self.class {
            ComplexityClass::SimpleAudio => self.is_audio_capable() || self.needs_tts(),
            ComplexityClass::ComplexText => self.needs_tts() || self.is_audio_capable(),
        };
        if !format_ok {
            return Some(format!(
                "{} response without a speech engine",
                self.response_format
            ));
        }
        None
    }

    pub fn is_usable(&self) -> bool {
        self.unusable_reason().is_none()
    }
}
