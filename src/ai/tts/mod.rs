//! Speech Synthesis Normalizer
//!
//! Turns text answers into base64 audio through one of two engines:
//! - `azure`: SSML over the regional cognitive-services endpoint
//! - `google`: JSON request, `audioContent` in the response
//!
//! Failures are reported, never retried here.

pub mod azure;
pub mod google;
mod speech_text;

pub use speech_text::optimize_for_speech;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::TtsSettings;
use crate::types::VendorError;

/// Engine dispatch over the shared HTTP client
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    client: reqwest::Client,
}

impl SpeechSynthesizer {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Synthesize `text` with `engine`, applying speech rewrites when enabled
    #[instrument(skip(self, text, settings, cancel), fields(chars = text.chars().count()))]
    pub async fn synthesize(
        &self,
        engine: &str,
        text: &str,
        voice: Option<&str>,
        settings: &TtsSettings,
        cancel: &CancellationToken,
    ) -> Result<String, VendorError> {
        let prepared = if settings.optimize_text {
            optimize_for_speech(text)
        } else {
            text.to_string()
        };
        if prepared.trim().is_empty() {
            return Err(VendorError::malformed("nothing to synthesize", engine));
        }

        debug!(engine = %engine, "Synthesizing speech");
        match engine {
            azure::ENGINE => {
                let config = settings.azure.as_ref().ok_or_else(|| {
                    VendorError::misconfigured("ttsServices.azure is not configured", engine)
                })?;
                azure::synthesize(&self.client, config, &prepared, voice, cancel).await
            }
            google::ENGINE => {
                let config = settings.google.as_ref().ok_or_else(|| {
                    VendorError::misconfigured("ttsServices.google is not configured", engine)
                })?;
                google::synthesize(&self.client, config, &prepared, voice, cancel).await
            }
            other => Err(VendorError::misconfigured(
                format!("unknown speech engine '{}'", other),
                other,
            )),
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;

    #[tokio::test]
    async fn test_unconfigured_engine_rejected() {
        let synth = SpeechSynthesizer::new(reqwest::Client::new());
        let err = synth
            .synthesize(
                "azure",
                "Bonjour",
                None,
                &TtsSettings::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::BadRequest);
        assert_eq!(err.provider, "azure");
    }

    #[tokio::test]
    async fn test_unknown_engine_rejected() {
        let synth = SpeechSynthesizer::new(reqwest::Client::new());
        let err = synth
            .synthesize(
                "polly",
                "Bonjour",
                None,
                &TtsSettings::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("polly"));
    }

    #[tokio::test]
    async fn test_blank_text_rejected() {
        let synth = SpeechSynthesizer::new(reqwest::Client::new());
        let err = synth
            .synthesize("google", "   ", None, &TtsSettings::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::ParseError);
    }
}
