use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{NormalizedAudio, Transcript};

/// Posts WAV bytes to a self-hosted recognition server (Vosk style
/// `POST /transcribe` answering `{"text": "..."}`).
pub struct SelfHostedEngine {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl SelfHostedEngine {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let endpoint = format!("{}/transcribe", base_url.trim_end_matches('/'));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[derive(Deserialize)]
struct SelfHostedResponse {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TranscriptionEngine for SelfHostedEngine {
    async fn transcribe(
        &self,
        audio: &NormalizedAudio,
        _language_hints: &[String],
    ) -> Result<Transcript, TranscriptionError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            bytes = audio.data.len(),
            "Sending audio to self-hosted recognizer"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio.data.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionError::TimedOut(self.timeout.as_secs())
                } else {
                    TranscriptionError::ApiRequestFailed(format!("request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: SelfHostedResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("parse response: {}", e)))?;

        let text = result.text.unwrap_or_default();

        tracing::info!(
            chars = text.len(),
            "Self-hosted transcription completed"
        );

        Ok(Transcript::new(text))
    }
}
