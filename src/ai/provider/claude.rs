//! Claude Adapter
//!
//! Anthropic Messages API. Text only.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdapterRequest, ResponseAdapter};
use crate::ai::http;
use crate::types::{ResponsePayload, VendorError};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct ClaudeAdapter {
    client: reqwest::Client,
}

impl ClaudeAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResponseAdapter for ClaudeAdapter {
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
        let provider = request.provider();
        let definition = &request.definition;
        let key = request.credential()?;
        let url = http::join_url(&request.base_url(DEFAULT_API_BASE), "messages");

        let body = MessagesRequest {
            model: &definition.model,
            max_tokens: definition.max_tokens,
            temperature: definition.temperature,
            system: request.system_prompt(),
            messages: vec![Message {
                role: "user",
                content: &request.question,
            }],
        };

        debug!(provider = %provider, model = %definition.model, "Sending messages request");
        let builder = self
            .client
            .post(url)
            .header("x-api-key", key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let builder = http::with_headers(builder, &definition.headers);

        let response = http::send(builder, &request.cancel, provider).await?;
        let parsed: MessagesResponse = http::read_json(response, &request.cancel, provider).await?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .map(ResponsePayload::Text)
            .ok_or_else(|| VendorError::malformed("no text block in response", provider))
    }

    fn name(&self) -> &str {
        "claude"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}
