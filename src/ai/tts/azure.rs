//! SSML speech engine (`azure`)
//!
//! Posts an SSML document to the regional cognitive-services endpoint and
//! returns the MP3 body base64-encoded.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ai::http;
use crate::config::{AzureTtsConfig, resolve_env_reference, resolve_secret};
use crate::constants::tts::{
    AZURE_DEFAULT_VOICE, AZURE_OUTPUT_FORMAT, AZURE_URL_TEMPLATE, DEFAULT_LANGUAGE,
};
use crate::types::VendorError;

pub const ENGINE: &str = "azure";

/// Synthesize `text`, using `voice` or the configured default voice
pub async fn synthesize(
    client: &reqwest::Client,
    config: &AzureTtsConfig,
    text: &str,
    voice: Option<&str>,
    cancel: &CancellationToken,
) -> Result<String, VendorError> {
    let key = resolve_secret(config.api_key.as_deref())
        .ok_or_else(|| VendorError::misconfigured("no resolvable apiKey", ENGINE))?;
    let url = endpoint(config)?;

    let voice = voice
        .or(config.default_voice.as_deref())
        .unwrap_or(AZURE_DEFAULT_VOICE);
    let language = config.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
    let ssml = build_ssml(text, voice, config.speed, &config.pitch, language);

    debug!(voice = %voice, chars = text.chars().count(), "Azure speech request");
    let request = client
        .post(&url)
        .header("Ocp-Apim-Subscription-Key", key.expose_secret())
        .header("Content-Type", "application/ssml+xml")
        .header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)
        .body(ssml);

    let response = http::send(request, cancel, ENGINE).await?;
    let audio = http::read_bytes(response, cancel, ENGINE).await?;
    if audio.is_empty() {
        return Err(VendorError::malformed("empty audio body", ENGINE));
    }
    Ok(BASE64.encode(audio))
}

/// Explicit endpoint, or the regional URL built from `region`
fn endpoint(config: &AzureTtsConfig) -> Result<String, VendorError> {
    if let Some(url) = config.endpoint.as_deref().and_then(resolve_env_reference) {
        return Ok(url);
    }
    let region = config
        .region
        .as_deref()
        .and_then(resolve_env_reference)
        .ok_or_else(|| VendorError::misconfigured("no resolvable region", ENGINE))?;
    Ok(AZURE_URL_TEMPLATE.replace("{region}", &region))
}

pub fn build_ssml(text: &str, voice: &str, speed: f64, pitch: &str, language: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="{lang}">"#,
            r#"<voice name="{voice}"><prosody rate="{rate}" pitch="{pitch}">{text}</prosody></voice>"#,
            "</speak>"
        ),
        lang = escape_xml(language),
        voice = escape_xml(voice),
        rate = speed,
        pitch = escape_xml(pitch),
        text = escape_xml(text),
    )
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
