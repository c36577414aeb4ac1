//! Gemini Adapter (`gemini_live`)
//!
//! `generateContent` for the answer; speech goes through the JSON engine with
//! the provider's own key and voice.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdapterRequest, ResponseAdapter};
use crate::ai::http;
use crate::ai::tts::google;
use crate::config::GoogleTtsConfig;
use crate::types::{ResponsePayload, VendorError};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn generate(&self, request: &AdapterRequest) -> Result<String, VendorError> {
        let provider = request.provider();
        let definition = &request.definition;
        let key = request.credential()?;
        let base = request.base_url(DEFAULT_API_BASE);
        let url = http::join_url(&base, &format!("models/{}:generateContent", definition.model));

        let prompt = format!("{}\n\nQuestion : {}", request.system_prompt(), request.question);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: definition.temperature,
                max_output_tokens: definition.max_tokens,
                top_p: 0.95,
                top_k: 40,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                })
                .collect(),
        };

        debug!(provider = %provider, model = %definition.model, "Sending generateContent");
        let builder = self
            .client
            .post(url)
            .query(&[("key", key.expose_secret())])
            .json(&body);
        let builder = http::with_headers(builder, &definition.headers);

        let response = http::send(builder, &request.cancel, provider).await?;
        let parsed: GenerateResponse = http::read_json(response, &request.cancel, provider).await?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| VendorError::malformed("no text in first candidate", provider))
    }

    /// JSON engine settings, keyed with the provider's credential
    fn speech_config(request: &AdapterRequest) -> GoogleTtsConfig {
        let mut config = request.snapshot.tts.google.clone().unwrap_or_default();
        config.api_key = request.definition.api_key.clone();
        config
    }
}

#[async_trait]
impl ResponseAdapter for GeminiAdapter {
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
        let text = self.generate(request).await?;
        if !request.definition.is_audio_capable() {
            return Ok(ResponsePayload::Text(text));
        }

        let config = Self::speech_config(request);
        let audio = google::synthesize(
            &self.client,
            &config,
            &text,
            request.definition.voice.as_deref(),
            &request.cancel,
        )
        .await
        .map_err(|mut e| {
            e.provider = request.provider().to_string();
            e
        })?;
        Ok(ResponsePayload::Audio(audio))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    top_p: f64,
    top_k: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::test_support::{request_for, serve};
    use crate::types::{ComplexityClass, ErrorCategory};
    use axum::{Json, Router, extract::Query, routing::post};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_text_answer() {
        let base = serve(Router::new().route(
            "/models/:model",
            post(
                |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                    assert_eq!(query.get("key").map(String::as_str), Some("test-key"));
                    assert_eq!(body["generationConfig"]["topK"], 40);
                    Json(json!({"candidates": [{"content": {"parts": [{"text": "Il fait beau."}]}}]}))
                },
            ),
        ))
        .await;

        let mut request = request_for("gemini_live", ComplexityClass::SimpleAudio, &base);
        request.definition.response_format = crate::types::ResponseFormat::Text;

        let payload = GeminiAdapter::new(reqwest::Client::new())
            .complete(&request)
            .await
            .unwrap();
        assert_eq!(payload, ResponsePayload::Text("Il fait beau.".to_string()));
    }

    #[tokio::test]
    async fn test_audio_via_speech_engine() {
        let base = serve(
            Router::new()
                .route(
                    "/models/:model",
                    post(|| async {
                        Json(json!({"candidates": [{"content": {"parts": [{"text": "Oui."}]}}]}))
                    }),
                )
                .route(
                    "/synthesize",
                    post(|Json(body): Json<Value>| async move {
                        assert_eq!(body["input"]["text"], "Oui.");
                        Json(json!({"audioContent": "SUQz"}))
                    }),
                ),
        )
        .await;

        let mut request = request_for("gemini_live", ComplexityClass::SimpleAudio, &base);
        let mut snapshot = (*request.snapshot).clone();
        if let Some(google) = snapshot.tts.google.as_mut() {
            google.endpoint = Some(format!("{}/synthesize", base));
        }
        request.snapshot = Arc::new(snapshot);

        let payload = GeminiAdapter::new(reqwest::Client::new())
            .complete(&request)
            .await
            .unwrap();
        assert_eq!(payload, ResponsePayload::Audio("SUQz".to_string()));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let base = serve(Router::new().route(
            "/models/:model",
            post(|| async { Json(json!({"candidates": []})) }),
        ))
        .await;
        let request = request_for("gemini_live", ComplexityClass::SimpleAudio, &base);

        let err = GeminiAdapter::new(reqwest::Client::new())
            .complete(&request)
            .await
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::ParseError);
    }
}
