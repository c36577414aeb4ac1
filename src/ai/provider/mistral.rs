//! Mistral Adapter
//!
//! Chat Completions with safe prompting. Text only.

use async_trait::async_trait;

use super::chat::{self, Auth, ChatTuning};
use super::{AdapterRequest, ResponseAdapter};
use crate::ai::http;
use crate::types::{ResponsePayload, VendorError};

const DEFAULT_API_BASE: &str = "https://api.mistral.ai/v1";

#[derive(Debug, Clone)]
pub struct MistralAdapter {
    client: reqwest::Client,
}

impl MistralAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResponseAdapter for MistralAdapter {
    async fn complete(&self, request: &AdapterRequest) -> Result<ResponsePayload, VendorError> {
        let key = request.credential()?;
        let url = http::join_url(&request.base_url(DEFAULT_API_BASE), "chat/completions");

        chat::complete(
            &self.client,
            &url,
            Auth::Bearer(key),
            ChatTuning {
                top_p: Some(0.9),
                safe_prompt: Some(true),
                ..Default::default()
            },
            request,
        )
        .await
        .map(ResponsePayload::Text)
    }

    fn name(&self) -> &str {
        "mistral"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::test_support::{request_for, serve};
    use crate::types::{ComplexityClass, ErrorCategory};
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_text_answer() {
        let base = serve(Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer test-key");
                assert_eq!(body["safe_prompt"], true);
                assert_eq!(body["top_p"], 0.9);
                assert_eq!(body["max_tokens"], 150);
                Json(json!({"choices": [{"message": {"content": "Bonjour !"}}]}))
            }),
        ))
        .await;

        let request = request_for("mistral", ComplexityClass::ComplexText, &base);
        let payload = MistralAdapter::new(reqwest::Client::new())
            .complete(&request)
            .await
            .unwrap();
        assert_eq!(payload, ResponsePayload::Text("Bonjour !".to_string()));
    }

    #[tokio::test]
    async fn test_no_choices_is_malformed() {
        let base = serve(Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        ))
        .await;

        let request = request_for("mistral", ComplexityClass::ComplexText, &base);
        let err = MistralAdapter::new(reqwest::Client::new())
            .complete(&request)
            .await
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::ParseError);
        assert_eq!(err.provider, "mistral");
    }
}
