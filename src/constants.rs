//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Provider selection and materialization defaults
pub mod selection {
    /// Weight assumed for an entry without `weight` when building the roulette
    pub const POOL_DEFAULT_WEIGHT: u32 = 10;

    /// Weight recorded on a materialized definition without `weight`
    pub const MATERIALIZED_DEFAULT_WEIGHT: u32 = 1;

    /// Priority recorded on a materialized definition without `priority`
    pub const DEFAULT_PRIORITY: u32 = 999;

    /// Maximum output length (tokens)
    pub const DEFAULT_MAX_TOKENS: u32 = 150;

    /// Sampling temperature
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
}

/// Dispatch and reload defaults
pub mod dispatch {
    /// Vendor call budget (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

    /// Snapshot reload interval (milliseconds)
    pub const DEFAULT_RELOAD_INTERVAL_MS: u64 = 300_000;

    /// Extra providers attempted after a failed dispatch
    pub const DEFAULT_MAX_RETRIES: u32 = 2;
}

/// Question classifier defaults
pub mod classifier {
    /// Score at or above which a question is COMPLEX_TEXT
    pub const DEFAULT_THRESHOLD: i32 = 3;

    /// Length (characters) above which a question earns a point
    pub const LONG_QUESTION_CHARS: usize = 100;

    /// Reasoning-request pattern, matched case-insensitively
    pub const DEFAULT_REASONING_PATTERN: &str = r"\b(pourquoi|comment|expliqu|why|how|explain)";

    pub const COMPLEX_KEYWORD_WEIGHT: i32 = 2;
    pub const SIMPLE_KEYWORD_WEIGHT: i32 = 1;
    pub const REASONING_WEIGHT: i32 = 2;
}

/// Speech synthesis defaults
pub mod tts {
    pub const AZURE_URL_TEMPLATE: &str =
        "https://{region}.tts.speech.microsoft.com/cognitiveservices/v1";
    pub const AZURE_OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";
    pub const AZURE_DEFAULT_VOICE: &str = "fr-FR-DeniseNeural";

    pub const GOOGLE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
    pub const GOOGLE_DEFAULT_VOICE: &str = "fr-FR-Wavenet-C";

    pub const DEFAULT_LANGUAGE: &str = "fr-FR";
    pub const DEFAULT_GENDER: &str = "FEMALE";
    pub const DEFAULT_ENCODING: &str = "MP3";

    pub const USER_AGENT: &str = "voxroute";
}

/// HTTP/Network constants
pub mod network {
    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Budget for out-of-band health probes (seconds)
    pub const HEALTH_PROBE_TIMEOUT_SECS: u64 = 10;
}

/// Persona used when a provider has no system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "Tu es Angèle, un assistant vocal intelligent et bienveillant. \
Réponds de manière naturelle et concise, comme dans une conversation parlée.";
