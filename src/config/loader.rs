//! Routing Document Loader
//!
//! Reads the routing document from disk and validates it into a
//! [`ConfigSnapshot`]. The format follows the file extension: `.json` is read
//! with serde_json, anything else as TOML (with table order preserved).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::snapshot::ConfigSnapshot;
use super::types::RoutingDocument;
use crate::types::{Result, VoxError};

/// On-disk encoding of a routing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Routing document loader
pub struct RoutingLoader;

impl RoutingLoader {
    /// Read, parse and validate the document at `path`
    pub fn load(path: &Path) -> Result<ConfigSnapshot> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                VoxError::missing(format!("routing document not found: {}", path.display()))
            }
            _ => VoxError::Io(e),
        })?;

        debug!(path = %path.display(), "Parsing routing document");
        let doc = Self::parse(&content, DocumentFormat::from_path(path))?;
        let snapshot = ConfigSnapshot::from_document(doc, Some(path.to_path_buf()))?;

        info!(
            path = %path.display(),
            audio = snapshot.audio_providers.len(),
            text = snapshot.text_providers.len(),
            "Routing document loaded"
        );
        Ok(snapshot)
    }

    /// Parse document text without validating it
    pub fn parse(content: &str, format: DocumentFormat) -> Result<RoutingDocument> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content)
                .map_err(|e| VoxError::invalid(format!("routing document: {}", e))),
            DocumentFormat::Toml => toml::from_str(content)
                .map_err(|e| VoxError::invalid(format!("routing document: {}", e))),
        }
    }

    /// Write a starter document, refusing to overwrite unless `force`
    pub fn init(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            return Err(VoxError::invalid(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => Self::default_document_json(),
            DocumentFormat::Toml => Self::default_document_toml(),
        };
        fs::write(path, content)?;
        info!("Created routing document: {}", path.display());
        Ok(path.to_path_buf())
    }

    // =========================================================================
    // Templates
    // =========================================================================

    fn default_document_json() -> &'static str {
        r#"{
  "audioProviders": {
    "openai_realtime": {
      "enabled": true,
      "priority": 1,
      "weight": 40,
      "apiKey": "${OPENAI_API_KEY}",
      "model": "gpt-4o-mini",
      "voice": "nova",
      "responseFormat": "audio"
    },
    "gemini_live": {
      "enabled": true,
      "priority": 2,
      "weight": 30,
      "apiKey": "${GEMINI_API_KEY}",
      "model": "gemini-1.5-flash",
      "voice": "fr-FR-Wavenet-C"
    },
    "copilot_speech": {
      "enabled": false,
      "priority": 3,
      "weight": 30,
      "apiKey": "${AZURE_OPENAI_KEY}",
      "model": "gpt-4o",
      "endpoint": "${AZURE_OPENAI_RESOURCE}",
      "voice": "fr-FR-DeniseNeural"
    }
  },
  "textProviders": {
    "claude": {
      "enabled": true,
      "priority": 1,
      "weight": 50,
      "apiKey": "${ANTHROPIC_API_KEY}",
      "model": "claude-3-haiku-20240307",
      "maxTokens": 300,
      "ttsProvider": "azure"
    },
    "mistral": {
      "enabled": true,
      "priority": 2,
      "weight": 30,
      "apiKey": "${MISTRAL_API_KEY}",
      "model": "mistral-small-latest",
      "maxTokens": 300,
      "ttsProvider": "google"
    },
    "openai_text": {
      "enabled": true,
      "priority": 3,
      "weight": 20,
      "apiKey": "${OPENAI_API_KEY}",
      "model": "gpt-4o-mini",
      "maxTokens": 300,
      "ttsProvider": "azure"
    }
  },
  "questionAnalysis": {
    "complexityKeywords": ["pourquoi", "comment", "expliqu", "analyse", "compare", "différence", "why", "how", "explain"],
    "simpleKeywords": ["quelle heure", "heure", "quel jour", "date", "météo", "bonjour", "merci"],
    "complexityThreshold": 3
  },
  "ttsServices": {
    "azure": {
      "region": "${AZURE_SPEECH_REGION}",
      "apiKey": "${AZURE_SPEECH_KEY}",
      "defaultVoice": "fr-FR-DeniseNeural",
      "speed": 1.0,
      "pitch": "default"
    },
    "google": {
      "apiKey": "${GOOGLE_TTS_KEY}",
      "defaultVoice": "fr-FR-Wavenet-C",
      "speed": 1.0,
      "pitch": 0.0
    },
    "optimizeText": true
  },
  "aiSelectionConfig": {
    "timeoutMs": 5000,
    "fallbackOnError": true,
    "maxRetries": 2,
    "reloadIntervalMs": 300000
  },
  "statisticsTracking": {
    "enabled": true,
    "logSelections": true
  }
}
"#
    }

    fn default_document_toml() -> &'static str {
        r#"# voxroute routing document
# Pools are walked in the order written here.

[audioProviders.openai_realtime]
priority = 1
weight = 40
apiKey = "${OPENAI_API_KEY}"
model = "gpt-4o-mini"
voice = "nova"

[audioProviders.gemini_live]
priority = 2
weight = 30
apiKey = "${GEMINI_API_KEY}"
model = "gemini-1.5-flash"

[textProviders.claude]
priority = 1
weight = 50
apiKey = "${ANTHROPIC_API_KEY}"
model = "claude-3-haiku-20240307"
maxTokens = 300
ttsProvider = "azure"

[textProviders.mistral]
priority = 2
weight = 30
apiKey = "${MISTRAL_API_KEY}"
model = "mistral-small-latest"
maxTokens = 300
ttsProvider = "google"

[questionAnalysis]
complexityKeywords = ["pourquoi", "comment", "expliqu", "analyse", "compare", "différence", "why", "how", "explain"]
simpleKeywords = ["quelle heure", "heure", "quel jour", "date", "météo", "bonjour", "merci"]
complexityThreshold = 3

[ttsServices]
optimizeText = true

[ttsServices.azure]
region = "${AZURE_SPEECH_REGION}"
apiKey = "${AZURE_SPEECH_KEY}"
defaultVoice = "fr-FR-DeniseNeural"

[ttsServices.google]
apiKey = "${GOOGLE_TTS_KEY}"
defaultVoice = "fr-FR-Wavenet-C"

[aiSelectionConfig]
timeoutMs = 5000
fallbackOnError = true
maxRetries = 2
reloadIntervalMs = 300000

[statisticsTracking]
enabled = true
logSelections = true
"#
    }
}
