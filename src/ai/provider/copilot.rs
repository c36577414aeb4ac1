//! Copilot Adapter (`copilot_speech`)
//!
//! Azure OpenAI chat deployment for the answer, SSML engine for speech. The
//! entry's `model` names the deployment; `endpoint` is either the Azure
//! resource name or a full resource URL.

use async_trait::async_trait;
use tracing::debug;

use super::chat::{self, Auth, ChatTuning};
use super::{AdapterRequest, ResponseAdapter};
use crate::ai::tts::azure;
use crate::types::{ResponsePayload, VendorError};

const API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone)]
pub struct CopilotAdapter {
    client: reqwest::Client,
}

impl CopilotAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn deployment_url(request: &AdapterRequest) -> Result<String, VendorError> {
        let endpoint = request.definition.resolved_endpoint().ok_or_else(|| {
            VendorError::misconfigured("no Azure OpenAI endpoint", request.provider())
        })?;
        let base = if endpoint.starts_with("http") {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("https://{}.openai.azure.com", endpoint)
        };
        Ok(format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            base, request.definition.model, API_VERSION
        ))
    }
}

/// Sampling by topic: Microsoft products get precise answers, productivity
/// questions a middle ground, everything else the configured temperature
pub fn topic_tuning(question: &str, default_temperature: f64) -> (f64, f64) {
    let lowered = question.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if mentions(&["microsoft", "office", "windows", "azure"]) {
        (0.3, 0.8)
    } else if mentions(&["productivité", "travail", "organisation"]) {
        (0.5, 0.9)
    } else {
        (default_temperature, 0.95)
    }
}

#[async_trait]
impl ResponseAdapter for CopilotAdapter {
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
        let key = request.credential()?;
        let url = Self::deployment_url(request)?;
        let (temperature, top_p) =
            topic_tuning(&request.question, request.definition.temperature);

        let text = chat::complete(
            &self.client,
            &url,
            Auth::ApiKey(key),
            ChatTuning {
                omit_model: true,
                temperature: Some(temperature),
                top_p: Some(top_p),
                safe_prompt: None,
            },
            request,
        )
        .await?;

        if !request.definition.is_audio_capable() {
            return Ok(ResponsePayload::Text(text));
        }

        let config = request.snapshot.tts.azure.as_ref().ok_or_else(|| {
            VendorError::misconfigured("ttsServices.azure is not configured", request.provider())
        })?;
        debug!(provider = %request.provider(), "Speaking Copilot answer");
        let audio = azure::synthesize(
            &self.client,
            config,
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
        "copilot"
    }
}
