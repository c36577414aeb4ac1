//! JSON speech engine (`google`)

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ai::http;
use crate::config::{GoogleTtsConfig, resolve_env_reference, resolve_secret};
use crate::constants::tts::{
    DEFAULT_ENCODING, DEFAULT_GENDER, DEFAULT_LANGUAGE, GOOGLE_DEFAULT_VOICE, GOOGLE_URL,
};
use crate::types::VendorError;

pub const ENGINE: &str = "google";

/// Synthesize `text`, using `voice` or the configured default voice
pub async fn synthesize(
    client: &reqwest::Client,
    config: &GoogleTtsConfig,
    text: &str,
    voice: Option<&str>,
    cancel: &CancellationToken,
) -> Result<String, VendorError> {
    let key = resolve_secret(config.api_key.as_deref())
        .ok_or_else(|| VendorError::misconfigured("no resolvable apiKey", ENGINE))?;
    let url = config
        .endpoint
        .as_deref()
        .and_then(resolve_env_reference)
        .unwrap_or_else(|| GOOGLE_URL.to_string());

    let body = build_request(config, text, voice);
    debug!(voice = %body.voice.name, chars = text.chars().count(), "Google speech request");

    let request = client
        .post(&url)
        .query(&[("key", key.expose_secret())])
        .json(&body);

    let response = http::send(request, cancel, ENGINE).await?;
    let parsed: SynthesizeResponse = http::read_json(response, cancel, ENGINE).await?;
    parsed
        .audio_content
        .filter(|audio| !audio.is_empty())
        .ok_or_else(|| VendorError::malformed("no audioContent in response", ENGINE))
}

fn build_request<'a>(
    config: &'a GoogleTtsConfig,
    text: &'a str,
    voice: Option<&'a str>,
) -> SynthesizeRequest<'a> {
    SynthesizeRequest {
        input: SynthesisInput { text },
        voice: VoiceSelection {
            language_code: config.language_code.as_deref().unwrap_or(DEFAULT_LANGUAGE),
            name: voice
                .or(config.default_voice.as_deref())
                .unwrap_or(GOOGLE_DEFAULT_VOICE),
            ssml_gender: config.gender.as_deref().unwrap_or(DEFAULT_GENDER),
        },
        audio_config: AudioConfig {
            audio_encoding: DEFAULT_ENCODING,
            speaking_rate: config.speed,
            pitch: config.pitch,
            volume_gain_db: config.volume_gain_db,
        },
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
    volume_gain_db: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}
