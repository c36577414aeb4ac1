//! Chat-completions wire format shared by OpenAI, Azure OpenAI and Mistral

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AdapterRequest;
use crate::ai::http;
use crate::types::VendorError;

/// How the credential travels
pub(super) enum Auth {
    /// `Authorization: Bearer <key>`
    Bearer(SecretString),
    /// `api-key: <key>` (Azure OpenAI)
    ApiKey(SecretString),
}

/// Vendor-specific knobs on top of the definition
#[derive(Debug, Default)]
pub(super) struct ChatTuning {
    /// Azure deployments carry the model in the URL
    pub omit_model: bool,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub safe_prompt: Option<bool>,
}

/// POST a chat-completions request and return the first choice's text
pub(super) async fn complete(
    client: &reqwest::Client,
    url: &str,
    auth: Auth,
    tuning: ChatTuning,
    request: &AdapterRequest,
) -> Result<String, VendorError> {
    let provider = request.provider();
    let definition = &request.definition;

    let body = ChatCompletionRequest {
        model: (!tuning.omit_model).then_some(definition.model.as_str()),
        messages: vec![
            ChatMessage {
                role: "system",
                content: request.system_prompt(),
            },
            ChatMessage {
                role: "user",
                content: &request.question,
            },
        ],
        max_tokens: definition.max_tokens,
        temperature: tuning.temperature.unwrap_or(definition.temperature),
        top_p: tuning.top_p,
        safe_prompt: tuning.safe_prompt,
    };

    debug!(provider = %provider, model = %definition.model, "Sending chat completion");
    let builder = client.post(url).json(&body);
    let builder = match &auth {
        Auth::Bearer(key) => builder.bearer_auth(key.expose_secret()),
        Auth::ApiKey(key) => builder.header("api-key", key.expose_secret()),
    };
    let builder = http::with_headers(builder, &definition.headers);

    let response = http::send(builder, &request.cancel, provider).await?;
    let parsed: ChatCompletionResponse =
        http::read_json(response, &request.cancel, provider).await?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| VendorError::malformed("no content in first choice", provider))
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safe_prompt: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
