//! OpenAI Adapter
//!
//! Chat Completions for the answer, then `/audio/speech` when the definition
//! wants audio. Serves both `openai_realtime` and `openai_text`.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use super::chat::{self, Auth, ChatTuning};
use super::{AdapterRequest, ResponseAdapter};
use crate::ai::http;
use crate::types::{ResponsePayload, VendorError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const SPEECH_MODEL: &str = "tts-1";
const DEFAULT_VOICE: &str = "nova";

#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    client: reqwest::Client,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn speak(
        &self,
        request: &AdapterRequest,
        base: &str,
        text: &str,
    ) -> Result<String, VendorError> {
        let provider = request.provider();
        let key = request.credential()?;
        let body = SpeechRequest {
            model: SPEECH_MODEL,
            input: text,
            voice: request
                .definition
                .voice
                .as_deref()
                .unwrap_or(DEFAULT_VOICE),
            response_format: "mp3",
            speed: 1.0,
        };

        let builder = self
            .client
            .post(http::join_url(base, "audio/speech"))
            .bearer_auth(key.expose_secret())
            .json(&body);
        let response = http::send(builder, &request.cancel, provider).await?;
        let audio = http::read_bytes(response, &request.cancel, provider).await?;
        if audio.is_empty() {
            return Err(VendorError::malformed("empty audio body", provider));
        }
        Ok(BASE64.encode(audio))
    }
}

#[async_trait]
impl ResponseAdapter for OpenAiAdapter {
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
        let start = Instant::now();
        let key = request.credential()?;
        let base = request.base_url(DEFAULT_API_BASE);

        let text = chat::complete(
            &self.client,
            &http::join_url(&base, "chat/completions"),
            Auth::Bearer(key),
            ChatTuning::default(),
            request,
        )
        .await?;

        if !request.definition.is_audio_capable() {
            debug!(provider = %request.provider(), "Returning text answer");
            return Ok(ResponsePayload::Text(text));
        }

        let audio = self.speak(request, &base, &text).await?;
        info!(
            provider = %request.provider(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "OpenAI audio answer ready"
        );
        Ok(ResponsePayload::Audio(audio))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'static str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    speed: f64,
}
