//! Adapter Registry
//!
//! Maps lower-cased provider names to adapters. Pool entry names select the
//! adapter, so `openai_realtime` and `openai_text` share one implementation.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    ClaudeAdapter, CopilotAdapter, GeminiAdapter, MistralAdapter, OpenAiAdapter, SharedAdapter,
};

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, SharedAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter, sharing `client`
    pub fn with_defaults(client: reqwest::Client) -> Self {
        let openai: SharedAdapter = Arc::new(OpenAiAdapter::new(client.clone()));
        let mut registry = Self::new();
        registry.register("openai_realtime", Arc::clone(&openai));
        registry.register("openai_text", openai);
        registry.register("gemini_live", Arc::new(GeminiAdapter::new(client.clone())));
        registry.register("copilot_speech", Arc::new(CopilotAdapter::new(client.clone())));
        registry.register("claude", Arc::new(ClaudeAdapter::new(client.clone())));
        registry.register("mistral", Arc::new(MistralAdapter::new(client)));
        registry
    }

    /// Add or replace the adapter for `name`
    pub fn register(&mut self, name: &str, adapter: SharedAdapter) {
        self.adapters.insert(name.to_lowercase(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<SharedAdapter> {
        self.adapters.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{AUDIO_ADAPTERS, TEXT_ADAPTERS};

    #[test]
    fn test_defaults_cover_known_adapters() {
        let registry = AdapterRegistry::with_defaults(reqwest::Client::new());
        for name in AUDIO_ADAPTERS.iter().chain(TEXT_ADAPTERS) {
            assert!(registry.contains(name), "missing adapter {}", name);
        }
        assert_eq!(registry.names().len(), 6);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = AdapterRegistry::with_defaults(reqwest::Client::new());
        assert_eq!(registry.get("Claude").unwrap().name(), "claude");
        assert_eq!(registry.get("OPENAI_TEXT").unwrap().name(), "openai");
        assert!(registry.get("llama").is_none());
    }
}
