//! Shared HTTP plumbing for vendor calls
//!
//! Every request goes through [`send`], which races the call against the
//! per-call cancellation token and turns non-success statuses into
//! [`VendorError`]s carrying the response body.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::constants::tts::USER_AGENT;
use crate::types::{Result, VendorError, VoxError};

/// Build the client shared by all adapters and speech engines
pub fn build_client(connect_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| VoxError::invalid(format!("Failed to create HTTP client: {}", e)))
}

/// Send `request`, abandoning it if `cancel` fires first
pub async fn send(
    request: RequestBuilder,
    cancel: &CancellationToken,
    provider: &str,
) -> std::result::Result<Response, VendorError> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(VendorError::cancelled(provider)),
        result = request.send() => result.map_err(|e| VendorError::from_transport(&e, provider))?,
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => String::new(),
        text = response.text() => text.unwrap_or_default(),
    };
    Err(VendorError::from_status(status.as_u16(), body, provider))
}

/// Decode a JSON body
pub async fn read_json<T: DeserializeOwned>(
    response: Response,
    cancel: &CancellationToken,
    provider: &str,
) -> std::result::Result<T, VendorError> {
    let bytes = read_bytes(response, cancel, provider).await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        VendorError::malformed(format!("unexpected response body: {}", e), provider)
    })
}

/// Collect a raw body
pub async fn read_bytes(
    response: Response,
    cancel: &CancellationToken,
    provider: &str,
) -> std::result::Result<Vec<u8>, VendorError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(VendorError::cancelled(provider)),
        body = response.bytes() => body
            .map(|b| b.to_vec())
            .map_err(|e| VendorError::from_transport(&e, provider)),
    }
}

/// Attach the extra headers configured on a provider entry
pub fn with_headers(mut request: RequestBuilder, headers: &IndexMap<String, String>) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(join_url("http://127.0.0.1:9000", "v1/x"), "http://127.0.0.1:9000/v1/x");
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let client = build_client(Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Unroutable address; cancellation wins the race
        let request = client.get("http://10.255.255.1:81/never");
        let err = send(request, &cancel, "openai_text").await.unwrap_err();
        assert_eq!(err.category, crate::types::ErrorCategory::Cancelled);
    }
}
