use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{NormalizedAudio, Transcript};
use crate::infrastructure::credentials::CloudCredential;

/// Synchronous `speech:recognize` call of a cloud speech-to-text API.
pub struct CloudSpeechEngine {
    client: Client,
    endpoint: String,
    credential: CloudCredential,
    enable_automatic_punctuation: bool,
    timeout: Duration,
}

impl CloudSpeechEngine {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(
        base_url: &str,
        api_version: &str,
        credential: CloudCredential,
        timeout: Duration,
    ) -> Self {
        let endpoint = format!(
            "{}/{}/speech:recognize",
            base_url.trim_end_matches('/'),
            api_version.trim_matches('/'),
        );
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            endpoint,
            credential,
            enable_automatic_punctuation: true,
            timeout,
        }
    }

    pub fn with_automatic_punctuation(mut self, enabled: bool) -> Self {
        self.enable_automatic_punctuation = enabled;
        self
    }
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alternative_language_codes: Vec<&'a str>,
    enable_automatic_punctuation: bool,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl TranscriptionEngine for CloudSpeechEngine {
    async fn transcribe(
        &self,
        audio: &NormalizedAudio,
        language_hints: &[String],
    ) -> Result<Transcript, TranscriptionError> {
        let (primary, alternatives) = language_hints.split_first().ok_or_else(|| {
            TranscriptionError::InvalidRequest("at least one language code is required".into())
        })?;

        let body = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: audio.sample_rate,
                language_code: primary,
                alternative_language_codes: alternatives.iter().map(String::as_str).collect(),
                enable_automatic_punctuation: self.enable_automatic_punctuation,
            },
            audio: RecognitionAudio {
                content: general_purpose::STANDARD.encode(&audio.data),
            },
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            language = %primary,
            alternatives = alternatives.len(),
            "Sending audio to cloud speech API"
        );

        let request = self.client.post(&self.endpoint).json(&body);
        let request = match &self.credential {
            CloudCredential::ApiKey(key) => request.query(&[("key", key)]),
            CloudCredential::AccessToken(token) => request.bearer_auth(token),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TranscriptionError::TimedOut(self.timeout.as_secs())
            } else {
                TranscriptionError::ApiRequestFailed(format!("request: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("parse response: {}", e)))?;

        let segments = result.results.len();
        let text = result
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::info!(
            segments,
            chars = text.len(),
            "Cloud speech transcription completed"
        );

        Ok(Transcript::new(text))
    }
}
