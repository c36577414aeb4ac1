pub mod error;

pub use error::{ErrorCategory, Result, VendorError, VoxError};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Routing Enums
// =============================================================================

/// Question complexity class, which also names the provider pool to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityClass {
    /// Short, direct questions answered by audio-capable providers
    SimpleAudio,
    /// Longer or analytical questions answered as text, then synthesized
    ComplexText,
}

impl ComplexityClass {
    /// Key of the matching pool in the routing document
    pub fn pool_key(self) -> &'static str {
        match self {
            Self::SimpleAudio => "audioProviders",
            Self::ComplexText => "textProviders",
        }
    }

    /// Response format assumed when an entry does not declare one
    pub fn default_response_format(self) -> ResponseFormat {
        match self {
            Self::SimpleAudio => ResponseFormat::Audio,
            Self::ComplexText => ResponseFormat::Text,
        }
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SimpleAudio => write!(f, "SIMPLE_AUDIO"),
            Self::ComplexText => write!(f, "COMPLEX_TEXT"),
        }
    }
}

impl std::str::FromStr for ComplexityClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "simple" | "simple_audio" | "audio" => Ok(Self::SimpleAudio),
            "complex" | "complex_text" | "text" => Ok(Self::ComplexText),
            _ => Err(format!(
                "Unknown complexity class '{}'. Valid values: simple, complex",
                s
            )),
        }
    }
}

/// What a provider hands back to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Audio,
    Text,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// How a provider is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Raw HTTP call against the configured endpoint
    Direct,
    /// Vendor default endpoint, credential optional
    #[default]
    Api,
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Api => write!(f, "api"),
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Final payload handed to the avatar/transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Base64-encoded compressed audio
    Audio(String),
    /// Plain text, when no speech synthesis is configured
    Text(String),
}

impl ResponsePayload {
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Audio(data) | Self::Text(data) => data,
        }
    }
}

// =============================================================================
// Domain Newtypes
// =============================================================================

/// Identifier attached to every question for log correlation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string()[..12].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
