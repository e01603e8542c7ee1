use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::infrastructure::credentials::CloudCredential;
use crate::presentation::config::{TranscriptionProviderSetting, TranscriptionSettings};

use super::cloud_speech_engine::CloudSpeechEngine;
use super::retrying_engine::RetryingTranscriptionEngine;
use super::self_hosted_engine::SelfHostedEngine;

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    /// `credential` is only consulted for the cloud provider.
    pub fn create(
        settings: &TranscriptionSettings,
        credential: Option<CloudCredential>,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        let timeout = Duration::from_secs(settings.timeout_secs);

        let engine: Arc<dyn TranscriptionEngine> = match settings.provider {
            TranscriptionProviderSetting::Cloud => {
                let credential = credential.ok_or_else(|| {
                    TranscriptionError::Misconfigured(
                        "credential required for cloud speech".to_string(),
                    )
                })?;
                tracing::info!(
                    base_url = %settings.cloud.base_url,
                    api_version = %settings.cloud.api_version,
                    "Using cloud speech transcription"
                );
                Arc::new(
                    CloudSpeechEngine::new(
                        &settings.cloud.base_url,
                        &settings.cloud.api_version,
                        credential,
                        timeout,
                    )
                    .with_automatic_punctuation(settings.cloud.enable_automatic_punctuation),
                )
            }
            TranscriptionProviderSetting::SelfHosted => {
                tracing::info!(
                    base_url = %settings.self_hosted.base_url,
                    "Using self-hosted transcription"
                );
                Arc::new(SelfHostedEngine::new(&settings.self_hosted.base_url, timeout))
            }
        };

        if settings.max_retries == 0 {
            return Ok(engine);
        }

        Ok(Arc::new(RetryingTranscriptionEngine::new(
            engine,
            settings.max_retries,
            Duration::from_millis(settings.retry_backoff_ms),
        )))
    }
}
